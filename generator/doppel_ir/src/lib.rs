//! Doppel IR - Contract Metadata Types
//!
//! This crate contains the data structures the doppel generator consumes:
//! - Type references with scope-relative rendering
//! - Generic parameters with variance and constraints
//! - Member declarations (operations, accessors, notifications, constructors)
//! - Contract declarations and contract sets
//!
//! # Design Philosophy
//!
//! The model is an explicit, serializable description of a contract type's
//! surface. Synthesizers never query a live type system; everything they need
//! is captured here once and consumed read-only. Every type derives Clone,
//! Eq, `PartialEq`, Hash, and Debug so member lists can be deduplicated and
//! compared cheaply, and Serialize/Deserialize so a contract set can be
//! loaded from a JSON document.

mod contract;
mod generics;
mod member;
mod type_ref;

pub use contract::{ContractDecl, ContractKind, ContractSet};
pub use generics::{
    render_constraint_clause, render_generic_list, ConstraintFlags, GenericParam, Variance,
};
pub use member::{Access, Dispatch, MemberDecl, ParamDecl, PassMode};
pub use type_ref::TypeRef;
