//! Doppel CLI
//!
//! Loads a contract-set document, runs the pattern synthesizers, and writes
//! the resulting artifacts to disk. All file persistence lives here; the
//! synthesis crates never touch the filesystem.

pub mod commands;
