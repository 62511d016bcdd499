//! Member declarations: one entry per unit of contract surface.
//!
//! The five recognized member kinds are closed. Anything else in the input
//! deserializes into [`MemberDecl::Unrecognized`], which extraction treats as
//! fatal - there is no synthesis strategy for it.

use serde::{Deserialize, Serialize};

use crate::generics::GenericParam;
use crate::type_ref::TypeRef;

/// How a parameter is passed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    /// Plain by-value parameter.
    #[default]
    Value,
    /// By-reference input/output (`ref`).
    Ref,
    /// By-reference output only (`out`). Generated bodies must assign it on
    /// every exit path that does not delegate to a value-producing call.
    Out,
}

impl PassMode {
    /// The parameter modifier, including a trailing space when present.
    pub fn modifier(self) -> &'static str {
        match self {
            PassMode::Value => "",
            PassMode::Ref => "ref ",
            PassMode::Out => "out ",
        }
    }

    /// Check for either by-reference mode.
    #[inline]
    pub fn is_by_ref(self) -> bool {
        !matches!(self, PassMode::Value)
    }
}

/// One declared parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ParamDecl {
    /// The parameter name.
    pub name: String,
    /// The parameter type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Passing mode, by-value unless stated.
    #[serde(default)]
    pub mode: PassMode,
}

impl ParamDecl {
    /// Create a by-value parameter.
    #[inline]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        ParamDecl {
            name: name.into(),
            ty,
            mode: PassMode::Value,
        }
    }

    /// Create a parameter with an explicit passing mode.
    #[inline]
    pub fn with_mode(name: impl Into<String>, ty: TypeRef, mode: PassMode) -> Self {
        ParamDecl {
            name: name.into(),
            ty,
            mode,
        }
    }
}

/// Visibility of a class-surface member.
///
/// Private and internal surface is not part of contract metadata; a metadata
/// producer only describes what a consumer outside the declaring module can
/// reach.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Reachable by any consumer.
    #[default]
    Public,
    /// Reachable by derived types only.
    Protected,
}

impl Access {
    /// The access keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
        }
    }
}

/// Override-ability of a class-surface member.
///
/// Capability-set members are always replaceable and default to `Abstract`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// No implementation exists; a subtype must supply one.
    #[default]
    Abstract,
    /// An implementation exists and a subtype may replace it.
    Virtual,
    /// The implementation cannot be replaced.
    Final,
}

impl Dispatch {
    /// Check whether a subtype may supply its own implementation.
    #[inline]
    pub fn is_overridable(self) -> bool {
        !matches!(self, Dispatch::Final)
    }
}

fn default_true() -> bool {
    true
}

fn default_item_name() -> String {
    "Item".to_string()
}

/// One unit of contract surface.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberDecl {
    /// A callable operation, possibly generic.
    Operation {
        name: String,
        #[serde(default)]
        generics: Vec<GenericParam>,
        #[serde(default)]
        params: Vec<ParamDecl>,
        /// Return type; absent for a void-shaped operation.
        #[serde(default)]
        returns: Option<TypeRef>,
        #[serde(default)]
        access: Access,
        #[serde(default)]
        dispatch: Dispatch,
    },

    /// A named value cell with get and/or set access.
    Accessor {
        name: String,
        #[serde(rename = "type")]
        value: TypeRef,
        #[serde(default = "default_true")]
        readable: bool,
        #[serde(default = "default_true")]
        writable: bool,
        #[serde(default)]
        access: Access,
        #[serde(default)]
        dispatch: Dispatch,
    },

    /// An accessor addressed by index parameters.
    IndexedAccessor {
        #[serde(default = "default_item_name")]
        name: String,
        params: Vec<ParamDecl>,
        #[serde(rename = "type")]
        value: TypeRef,
        #[serde(default = "default_true")]
        readable: bool,
        #[serde(default = "default_true")]
        writable: bool,
        #[serde(default)]
        access: Access,
        #[serde(default)]
        dispatch: Dispatch,
    },

    /// A subscription point delivering payloads to registered handlers.
    Notification {
        name: String,
        /// The handler delegate type the contract declares.
        handler: TypeRef,
        /// The payload type the handler receives.
        payload: TypeRef,
        #[serde(default)]
        access: Access,
        #[serde(default)]
        dispatch: Dispatch,
    },

    /// A constructor of an extensible-class contract.
    Constructor {
        #[serde(default)]
        params: Vec<ParamDecl>,
        #[serde(default)]
        access: Access,
    },

    /// Any member kind this generator has no synthesis strategy for.
    #[serde(other)]
    Unrecognized,
}

impl MemberDecl {
    /// The member name, empty for constructors and unrecognized members.
    pub fn name(&self) -> &str {
        match self {
            MemberDecl::Operation { name, .. }
            | MemberDecl::Accessor { name, .. }
            | MemberDecl::IndexedAccessor { name, .. }
            | MemberDecl::Notification { name, .. } => name,
            MemberDecl::Constructor { .. } | MemberDecl::Unrecognized => "",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn operation_defaults() {
        let json = r#"{ "kind": "operation", "name": "Refresh" }"#;
        let member: MemberDecl = serde_json::from_str(json).unwrap();
        match member {
            MemberDecl::Operation {
                name,
                generics,
                params,
                returns,
                access,
                dispatch,
            } => {
                assert_eq!(name, "Refresh");
                assert!(generics.is_empty());
                assert!(params.is_empty());
                assert_eq!(returns, None);
                assert_eq!(access, Access::Public);
                assert_eq!(dispatch, Dispatch::Abstract);
            }
            other => panic!("expected Operation, got {other:?}"),
        }
    }

    #[test]
    fn accessor_defaults_to_read_write() {
        let json = r#"{ "kind": "accessor", "name": "Count",
                        "type": { "namespace": "System", "name": "Int32" } }"#;
        let member: MemberDecl = serde_json::from_str(json).unwrap();
        match member {
            MemberDecl::Accessor {
                readable, writable, ..
            } => {
                assert!(readable);
                assert!(writable);
            }
            other => panic!("expected Accessor, got {other:?}"),
        }
    }

    #[test]
    fn indexed_accessor_defaults_name() {
        let json = r#"{ "kind": "indexed_accessor",
                        "params": [ { "name": "index",
                                      "type": { "namespace": "System", "name": "Int32" } } ],
                        "type": { "namespace": "System", "name": "String" } }"#;
        let member: MemberDecl = serde_json::from_str(json).unwrap();
        assert_eq!(member.name(), "Item");
    }

    #[test]
    fn unknown_kind_becomes_unrecognized() {
        let json = r#"{ "kind": "field", "name": "sampleField" }"#;
        let member: MemberDecl = serde_json::from_str(json).unwrap();
        assert_eq!(member, MemberDecl::Unrecognized);
    }

    #[test]
    fn pass_mode_modifiers() {
        assert_eq!(PassMode::Value.modifier(), "");
        assert_eq!(PassMode::Ref.modifier(), "ref ");
        assert_eq!(PassMode::Out.modifier(), "out ");
        assert!(PassMode::Out.is_by_ref());
        assert!(!PassMode::Value.is_by_ref());
    }
}
