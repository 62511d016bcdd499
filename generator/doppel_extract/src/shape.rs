//! Resolved member shapes.
//!
//! A `MemberShape` is a member with every type reference already rendered
//! relative to the root contract's namespace. Synthesizers consume shapes
//! read-only and never touch the metadata model again, so one extraction
//! pass serves all patterns.

use doppel_ir::{Access, Dispatch, PassMode};

/// One parameter with its type fully rendered.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResolvedParam {
    pub name: String,
    /// Rendered type name without passing-mode modifier.
    pub type_name: String,
    pub mode: PassMode,
}

/// Join parameter types: `int, string`.
///
/// Passing-mode modifiers are deliberately absent so overload signatures
/// compare by type sequence alone.
pub fn param_types(params: &[ResolvedParam]) -> String {
    let parts: Vec<&str> = params.iter().map(|p| p.type_name.as_str()).collect();
    parts.join(", ")
}

/// Join parameter names with modifiers: `a, ref b, out c`.
pub fn param_names(params: &[ResolvedParam]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|p| format!("{}{}", p.mode.modifier(), p.name))
        .collect();
    parts.join(", ")
}

/// Join full parameter declarations: `int a, ref string b`.
pub fn param_types_and_names(params: &[ResolvedParam]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|p| format!("{}{} {}", p.mode.modifier(), p.type_name, p.name))
        .collect();
    parts.join(", ")
}

/// Check whether any parameter passes by reference.
pub fn has_by_ref(params: &[ResolvedParam]) -> bool {
    params.iter().any(|p| p.mode.is_by_ref())
}

/// A callable operation shape.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct OperationShape {
    pub params: Vec<ResolvedParam>,
    /// Rendered return type; `None` for a void-shaped operation.
    pub return_type: Option<String>,
    /// Generic parameter names, empty for a non-generic operation.
    pub generic_names: Vec<String>,
    /// Rendered generic parameter list, e.g. `<T>`, or empty.
    pub generic_list: String,
    /// Rendered `where` clauses with leading space, or empty.
    pub constraint_clause: String,
}

impl OperationShape {
    /// Check whether this operation takes generic parameters.
    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.generic_names.is_empty()
    }
}

/// A named value cell shape.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AccessorShape {
    pub value_type: String,
    pub readable: bool,
    pub writable: bool,
}

/// An index-addressed accessor shape.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IndexedShape {
    pub params: Vec<ResolvedParam>,
    pub value_type: String,
    pub readable: bool,
    pub writable: bool,
}

/// A subscription point shape.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NotificationShape {
    /// The handler delegate type the contract declares.
    pub handler_type: String,
    /// The payload type registered handlers receive.
    pub payload_type: String,
}

/// A constructor shape (extensible-class contracts only).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstructorShape {
    pub params: Vec<ResolvedParam>,
}

/// Kind-specific data of a resolved member.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ShapeKind {
    Operation(OperationShape),
    Accessor(AccessorShape),
    IndexedAccessor(IndexedShape),
    Notification(NotificationShape),
    Constructor(ConstructorShape),
}

/// One resolved unit of contract surface.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberShape {
    /// The declaring contract's rendered type name.
    pub declaring_type: String,
    pub name: String,
    pub access: Access,
    pub dispatch: Dispatch,
    pub kind: ShapeKind,
}

impl MemberShape {
    /// The parameter-type sequence that, together with the name, identifies
    /// this member for collision purposes.
    ///
    /// Parameterless accessors use their value type as the sequence, and
    /// notifications their handler type, so same-name re-exposures with an
    /// identical type collapse onto one storage slot while differently-typed
    /// ones stay distinguishable.
    pub fn signature_types(&self) -> String {
        match &self.kind {
            ShapeKind::Operation(op) => param_types(&op.params),
            ShapeKind::Accessor(acc) => acc.value_type.clone(),
            ShapeKind::IndexedAccessor(idx) => param_types(&idx.params),
            ShapeKind::Notification(n) => n.handler_type.clone(),
            ShapeKind::Constructor(c) => param_types(&c.params),
        }
    }

    /// The `name(types)` signature key used for dedup and registry lookups.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.signature_types())
    }

    /// Check whether a class pattern may replace this member.
    #[inline]
    pub fn is_overridable(&self) -> bool {
        self.dispatch.is_overridable()
    }

    /// Check whether a base implementation exists to forward to.
    #[inline]
    pub fn has_base_implementation(&self) -> bool {
        matches!(self.dispatch, Dispatch::Virtual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params() -> Vec<ResolvedParam> {
        vec![
            ResolvedParam {
                name: "input".to_string(),
                type_name: "int".to_string(),
                mode: PassMode::Value,
            },
            ResolvedParam {
                name: "reference".to_string(),
                type_name: "string".to_string(),
                mode: PassMode::Ref,
            },
            ResolvedParam {
                name: "output".to_string(),
                type_name: "double".to_string(),
                mode: PassMode::Out,
            },
        ]
    }

    #[test]
    fn joined_lists_carry_modifiers_where_expected() {
        let params = params();
        assert_eq!(param_types(&params), "int, string, double");
        assert_eq!(param_names(&params), "input, ref reference, out output");
        assert_eq!(
            param_types_and_names(&params),
            "int input, ref string reference, out double output"
        );
        assert!(has_by_ref(&params));
    }

    #[test]
    fn empty_parameter_list_joins_to_empty() {
        assert_eq!(param_types(&[]), "");
        assert_eq!(param_names(&[]), "");
        assert_eq!(param_types_and_names(&[]), "");
        assert!(!has_by_ref(&[]));
    }

    #[test]
    fn accessor_signature_uses_value_type() {
        let shape = MemberShape {
            declaring_type: "IExample".to_string(),
            name: "Count".to_string(),
            access: Access::Public,
            dispatch: Dispatch::Abstract,
            kind: ShapeKind::Accessor(AccessorShape {
                value_type: "int".to_string(),
                readable: true,
                writable: false,
            }),
        };
        assert_eq!(shape.signature(), "Count(int)");
    }

    #[test]
    fn operation_signature_uses_param_types() {
        let shape = MemberShape {
            declaring_type: "IExample".to_string(),
            name: "Method1".to_string(),
            access: Access::Public,
            dispatch: Dispatch::Abstract,
            kind: ShapeKind::Operation(OperationShape {
                params: vec![ResolvedParam {
                    name: "a".to_string(),
                    type_name: "int".to_string(),
                    mode: PassMode::Value,
                }],
                return_type: None,
                generic_names: Vec::new(),
                generic_list: String::new(),
                constraint_clause: String::new(),
            }),
        };
        assert_eq!(shape.signature(), "Method1(int)");
    }
}
