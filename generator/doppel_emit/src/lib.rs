//! Doppel Emit
//!
//! Indentation-aware text accumulation for generated source artifacts.
//!
//! The writer knows nothing about contracts or patterns; it only tracks the
//! current indentation level and turns logical lines into indented text.
//! Synthesizers drive it, so every artifact is a pure function of the member
//! list that produced it.

mod writer;

pub use writer::{EmitConfig, SourceWriter};
