//! Generic parameters: variance, constraints, and their rendering.
//!
//! Constraint rendering normalizes forms the target syntax cannot express
//! directly: a `System.ValueType` base constraint becomes the `struct`
//! shorthand, and a parameterless-constructor constraint implied by `struct`
//! is dropped rather than emitted twice.

use serde::{Deserialize, Serialize};

use crate::type_ref::TypeRef;

bitflags::bitflags! {
    /// Special constraints carried by a generic parameter.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
    pub struct ConstraintFlags: u8 {
        /// `class` - the argument must be a reference type.
        const REFERENCE_TYPE = 1 << 0;
        /// `struct` - the argument must be a non-nullable value type.
        const VALUE_TYPE = 1 << 1;
        /// `new()` - the argument must expose a parameterless constructor.
        const PARAMETERLESS_CTOR = 1 << 2;
    }
}

/// Declaration-site variance of a generic parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    /// Invariant.
    #[default]
    None,
    /// Contravariant, rendered as the `in` modifier.
    In,
    /// Covariant, rendered as the `out` modifier.
    Out,
}

impl Variance {
    /// The declaration modifier, including a trailing space when present.
    pub fn modifier(self) -> &'static str {
        match self {
            Variance::None => "",
            Variance::In => "in ",
            Variance::Out => "out ",
        }
    }
}

/// One generic parameter of a contract or operation.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct GenericParam {
    /// The parameter name, e.g. `T`.
    pub name: String,
    /// Declaration-site variance.
    #[serde(default)]
    pub variance: Variance,
    /// Base-type constraints (`where T : SomeBase, ISomeContract`).
    #[serde(default)]
    pub constraints: Vec<TypeRef>,
    /// Special constraints (`class` / `struct` / `new()`).
    #[serde(default)]
    pub flags: ConstraintFlags,
}

impl GenericParam {
    /// Create an unconstrained, invariant parameter.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        GenericParam {
            name: name.into(),
            variance: Variance::None,
            constraints: Vec::new(),
            flags: ConstraintFlags::empty(),
        }
    }
}

/// Render a generic parameter list as `<in T, out U>`, or empty for no
/// parameters.
pub fn render_generic_list(params: &[GenericParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = params
        .iter()
        .map(|p| format!("{}{}", p.variance.modifier(), p.name))
        .collect();
    format!("<{}>", rendered.join(", "))
}

/// Render the `where` clauses for a parameter list, with a leading space, or
/// empty when no parameter carries constraints.
///
/// Primary constraints (`class`/`struct`) come first, then base types, then
/// `new()`, matching the order the target syntax requires.
pub fn render_constraint_clause(params: &[GenericParam], scope: &str) -> String {
    let mut result = String::new();

    for param in params {
        let mut parts: Vec<String> = Vec::new();
        let mut flags = param.flags;

        let mut bases: Vec<String> = Vec::new();
        for constraint in &param.constraints {
            let rendered = constraint.render(scope);
            if rendered == "System.ValueType" || (scope == "System" && rendered == "ValueType") {
                // Not constrainable by name; fold into the struct shorthand.
                flags |= ConstraintFlags::VALUE_TYPE;
            } else {
                bases.push(rendered);
            }
        }

        if flags.contains(ConstraintFlags::REFERENCE_TYPE) {
            parts.push("class".to_string());
        }
        if flags.contains(ConstraintFlags::VALUE_TYPE) {
            parts.push("struct".to_string());
        }
        parts.extend(bases);
        if flags.contains(ConstraintFlags::PARAMETERLESS_CTOR)
            && !flags.contains(ConstraintFlags::VALUE_TYPE)
        {
            // Every value type already has a parameterless constructor.
            parts.push("new()".to_string());
        }

        if parts.is_empty() {
            continue;
        }
        result.push_str(&format!(" where {} : {}", param.name, parts.join(", ")));
    }

    result
}
