//! Property tests for collision handling and synthesis determinism.

#![allow(clippy::unwrap_used)]

use doppel_ir::{Access, ContractDecl, ContractKind, Dispatch, MemberDecl, ParamDecl, TypeRef};
use doppel_synth::{sanitize_identifier, synthesize_all, NameRegistry};
use proptest::prelude::*;

/// Strategy for plausible rendered type names, including generic and nested
/// forms.
fn type_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9]{0,8}",
        "[A-Za-z][A-Za-z0-9]{0,8}\\.[A-Za-z][A-Za-z0-9]{0,8}",
        "[A-Za-z][A-Za-z0-9]{0,8}<[A-Za-z][A-Za-z0-9]{0,8}>",
        "[A-Za-z][A-Za-z0-9]{0,8}\\[\\]",
    ]
}

fn is_identifier_tail(fragment: &str) -> bool {
    fragment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

proptest! {
    #[test]
    fn sanitized_fragments_are_identifier_safe(
        types in proptest::collection::vec(type_name_strategy(), 0..4)
    ) {
        let joined = types.join(", ");
        let fragment = sanitize_identifier(&joined);
        prop_assert!(is_identifier_tail(&fragment));
    }

    #[test]
    fn registry_resolution_is_idempotent_across_runs(
        signatures in proptest::collection::vec(
            ("[A-Z][A-Za-z0-9]{0,6}", type_name_strategy()),
            1..12
        )
    ) {
        let resolve_all = || {
            let mut registry = NameRegistry::new();
            signatures
                .iter()
                .map(|(name, types)| registry.resolve(name, types, false))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(resolve_all(), resolve_all());
    }

    #[test]
    fn distinct_signatures_never_share_an_identifier(
        types in proptest::collection::vec(type_name_strategy(), 1..8)
    ) {
        // All members share one name; every distinct signature must land on
        // a distinct local identifier.
        let mut deduped = types.clone();
        deduped.sort();
        deduped.dedup();

        let mut registry = NameRegistry::new();
        let mut locals: Vec<String> = deduped
            .iter()
            .map(|t| registry.resolve("Overloaded", t, false).local_name)
            .collect();
        let before = locals.len();
        locals.sort();
        locals.dedup();
        // Sanitization can collapse distinct type sequences onto one
        // fragment only when they differ in stripped characters alone; the
        // generated strategies keep alphanumeric distinctions, so identity
        // must be preserved.
        prop_assert_eq!(locals.len(), before);
    }

    #[test]
    fn synthesis_is_deterministic_for_generated_contracts(
        member_names in proptest::collection::vec("[A-Z][A-Za-z0-9]{0,6}", 1..8)
    ) {
        let members: Vec<MemberDecl> = member_names
            .iter()
            .map(|name| MemberDecl::Operation {
                name: name.clone(),
                generics: Vec::new(),
                params: vec![ParamDecl::new("input", TypeRef::named("System", "Int32"))],
                returns: Some(TypeRef::named("System", "Int32")),
                access: Access::Public,
                dispatch: Dispatch::Abstract,
            })
            .collect();
        let contract = ContractDecl {
            name: "IGenerated".to_string(),
            namespace: Some("Tests.Types".to_string()),
            generics: Vec::new(),
            kind: ContractKind::Capability,
            members,
            ancestors: Vec::new(),
        };

        let first = synthesize_all(&contract).unwrap();
        let second = synthesize_all(&contract).unwrap();
        prop_assert_eq!(first, second);
    }
}
