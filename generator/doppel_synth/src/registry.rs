//! Name registry and collision policy.
//!
//! One registry lives per synthesis pass. Collision decisions are local to
//! the generated type: the same member can resolve differently in the Stub
//! and the Composite of one contract.
//!
//! The resolution algorithm, shared by every synthesizer:
//!
//! - First emission of an exact `(name, parameter-type sequence)` pair keeps
//!   the plain name, unless another signature already took the name - then a
//!   suffix derived from the parameter types disambiguates it.
//! - A later emission of an exact pair already registered (a member
//!   re-exposed identically through a diamond of ancestors) is a *repeat*:
//!   the caller must emit an explicitly-qualified redirect onto the stored
//!   identifier instead of a second storage slot.
//! - Reserved names (occupied by the generated type's own base surface)
//!   force explicit qualification no matter what.

use rustc_hash::FxHashSet;

/// The decision for one member emission.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Resolution {
    /// The identifier backing this member inside the generated type. For a
    /// repeated signature this is the identifier the first emission used.
    pub local_name: String,
    /// True when this exact signature was already emitted; the caller must
    /// redirect instead of allocating new storage.
    pub repeat_signature: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
struct Entry {
    name: String,
    types: String,
    local_name: String,
}

/// Tracks which member signatures a synthesis pass has already emitted.
#[derive(Default)]
pub struct NameRegistry {
    entries: Vec<Entry>,
    reserved: FxHashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as occupied by the generated type's own base surface.
    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    /// Check whether a name was reserved.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Resolve one member emission.
    ///
    /// `force_suffix` makes the suffixed form unconditional; the Stub uses
    /// it for by-reference operations, whose slot names embed the parameter
    /// types so each signature gets its own delegate declaration.
    pub fn resolve(&mut self, name: &str, types: &str, force_suffix: bool) -> Resolution {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.name == name && e.types == types)
        {
            return Resolution {
                local_name: entry.local_name.clone(),
                repeat_signature: true,
            };
        }

        let name_taken = self
            .entries
            .iter()
            .any(|e| e.name == name && e.types != types);
        let local_name = if name_taken || force_suffix {
            format!("{}_{}", name, sanitize_identifier(types))
        } else {
            name.to_string()
        };

        self.entries.push(Entry {
            name: name.to_string(),
            types: types.to_string(),
            local_name: local_name.clone(),
        });

        Resolution {
            local_name,
            repeat_signature: false,
        }
    }
}

/// Turn a rendered parameter-type sequence into a valid identifier fragment.
///
/// Separators, angle brackets, scope dots, and array brackets all become
/// underscores; anything else outside `[A-Za-z0-9_]` is stripped the same
/// way, so the result can always be appended to a member name.
pub fn sanitize_identifier(types: &str) -> String {
    let mut result = String::with_capacity(types.len());
    let mut chars = types.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ',' => {
                // ", " collapses to a single underscore.
                if chars.peek() == Some(&' ') {
                    chars.next();
                }
                result.push('_');
            }
            c if c.is_ascii_alphanumeric() || c == '_' => result.push(c),
            _ => result.push('_'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_emission_keeps_plain_name() {
        let mut registry = NameRegistry::new();
        let res = registry.resolve("Method1", "int", false);
        assert_eq!(res.local_name, "Method1");
        assert!(!res.repeat_signature);
    }

    #[test]
    fn conflicting_signature_gets_suffix() {
        let mut registry = NameRegistry::new();
        registry.resolve("Method1", "int", false);
        let res = registry.resolve("Method1", "string", false);
        assert_eq!(res.local_name, "Method1_string");
        assert!(!res.repeat_signature);
    }

    #[test]
    fn repeated_signature_reports_stored_identifier() {
        let mut registry = NameRegistry::new();
        registry.resolve("GetEnumerator", "", false);
        let res = registry.resolve("GetEnumerator", "", false);
        assert_eq!(res.local_name, "GetEnumerator");
        assert!(res.repeat_signature);
    }

    #[test]
    fn repeat_after_suffix_returns_suffixed_identifier() {
        let mut registry = NameRegistry::new();
        registry.resolve("Method1", "int", false);
        registry.resolve("Method1", "string", false);
        let res = registry.resolve("Method1", "string", false);
        assert_eq!(res.local_name, "Method1_string");
        assert!(res.repeat_signature);
    }

    #[test]
    fn forced_suffix_applies_without_collision() {
        let mut registry = NameRegistry::new();
        let res = registry.resolve("OutMethod", "int, int", true);
        assert_eq!(res.local_name, "OutMethod_int_int");
    }

    #[test]
    fn reserved_names_are_tracked() {
        let mut registry = NameRegistry::new();
        registry.reserve("Count");
        assert!(registry.is_reserved("Count"));
        assert!(!registry.is_reserved("Item"));
    }

    #[test]
    fn sanitize_strips_type_syntax() {
        assert_eq!(sanitize_identifier("int, int"), "int_int");
        assert_eq!(
            sanitize_identifier("System.Collections.Generic.IList<T>"),
            "System_Collections_Generic_IList_T_"
        );
        assert_eq!(sanitize_identifier("int[]"), "int__");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn resolution_is_deterministic() {
        let run = || {
            let mut registry = NameRegistry::new();
            vec![
                registry.resolve("M", "int", false).local_name,
                registry.resolve("M", "string", false).local_name,
                registry.resolve("M", "int, string", false).local_name,
            ]
        };
        assert_eq!(run(), run());
    }
}
