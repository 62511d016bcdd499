//! Type references and scope-relative name rendering.
//!
//! `TypeRef` captures the structure of a type reference as declared in the
//! contract metadata: a (possibly generic) named type or a reference to a
//! generic parameter. Rendering produces the canonical textual name relative
//! to a target namespace, with built-in alias substitution and scope elision.

use serde::{Deserialize, Serialize};

/// Built-in alias names for framework types.
///
/// `System.Void` is not usable by name in the target syntax, so it is always
/// rendered through its alias.
static BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("System.Void", "void"),
    ("System.Boolean", "bool"),
    ("System.Byte", "byte"),
    ("System.SByte", "sbyte"),
    ("System.Char", "char"),
    ("System.Decimal", "decimal"),
    ("System.Double", "double"),
    ("System.Single", "float"),
    ("System.Int32", "int"),
    ("System.UInt32", "uint"),
    ("System.Int64", "long"),
    ("System.UInt64", "ulong"),
    ("System.Object", "object"),
    ("System.Int16", "short"),
    ("System.UInt16", "ushort"),
    ("System.String", "string"),
];

/// Look up the built-in alias for a fully qualified type name, if any.
pub(crate) fn builtin_alias(qualified: &str) -> Option<&'static str> {
    BUILTIN_ALIASES
        .iter()
        .find(|(full, _)| *full == qualified)
        .map(|(_, alias)| *alias)
}

/// A structured type reference.
///
/// Examples as they appear in contract metadata:
///
/// ```json
/// { "namespace": "System", "name": "Int32" }
/// { "namespace": "System.Collections.Generic", "name": "List",
///   "args": [ { "param": "T" } ] }
/// { "param": "T" }
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// A reference to a generic parameter in scope, rendered as its bare name.
    Param {
        /// The parameter name, e.g. `T`.
        param: String,
    },

    /// A named type with optional generic arguments.
    Named {
        /// Declaring namespace, absent for global types.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        /// The type name without arity decoration.
        name: String,
        /// Generic type arguments, empty if non-generic.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },
}

impl TypeRef {
    /// Create a generic-parameter reference.
    #[inline]
    pub fn param(name: impl Into<String>) -> Self {
        TypeRef::Param { param: name.into() }
    }

    /// Create a named type without generic arguments.
    #[inline]
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef::Named {
            namespace: Some(namespace.into()),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a named type in the global namespace.
    #[inline]
    pub fn global(name: impl Into<String>) -> Self {
        TypeRef::Named {
            namespace: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a named type with generic arguments.
    #[inline]
    pub fn named_with_args(
        namespace: impl Into<String>,
        name: impl Into<String>,
        args: Vec<TypeRef>,
    ) -> Self {
        TypeRef::Named {
            namespace: Some(namespace.into()),
            name: name.into(),
            args,
        }
    }

    /// Shorthand for the `System.Void` reference.
    #[inline]
    pub fn void() -> Self {
        TypeRef::named("System", "Void")
    }

    /// Check if this reference is a generic parameter.
    #[inline]
    pub fn is_param(&self) -> bool {
        matches!(self, TypeRef::Param { .. })
    }

    /// Render this reference relative to a namespace scope.
    ///
    /// Aliases apply before scope elision, so `System.Int32` becomes `int`
    /// even when the scope is `System` itself. Generic arguments render
    /// recursively against the same scope.
    pub fn render(&self, scope: &str) -> String {
        match self {
            TypeRef::Param { param } => param.clone(),
            TypeRef::Named {
                namespace,
                name,
                args,
            } => {
                let qualified = match namespace.as_deref() {
                    Some(ns) if !ns.is_empty() => format!("{ns}.{name}"),
                    _ => name.clone(),
                };

                if args.is_empty() {
                    if let Some(alias) = builtin_alias(&qualified) {
                        return alias.to_string();
                    }
                }

                let mut result = qualified;
                if !args.is_empty() {
                    let rendered: Vec<String> =
                        args.iter().map(|arg| arg.render(scope)).collect();
                    result.push('<');
                    result.push_str(&rendered.join(", "));
                    result.push('>');
                }

                if !scope.is_empty() {
                    let prefix = format!("{scope}.");
                    if let Some(stripped) = result.strip_prefix(&prefix) {
                        return stripped.to_string();
                    }
                }
                result
            }
        }
    }
}
