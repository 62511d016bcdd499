//! Extraction failure taxonomy.
//!
//! Structural problems found during extraction are fatal for the whole
//! contract: emitting a partial implementation would leave the generated
//! type uncompilable, so nothing is emitted at all.

use thiserror::Error;

/// A structural problem that aborts synthesis for one contract type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The contract (or an ancestor) declares a member kind this generator
    /// has no synthesis strategy for.
    #[error("contract `{contract}` declares a member kind with no synthesis strategy")]
    UnsupportedMember {
        /// The contract that declares the offending member.
        contract: String,
    },
}
