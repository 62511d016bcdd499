//! Command-level tests: JSON round-trip into the metadata model and artifact
//! file writing.

#![allow(clippy::unwrap_used)]

use doppelc::commands::{self, OutputOptions};

const CONTRACTS: &str = r#"{
    "contracts": [
        {
            "name": "IExample",
            "namespace": "Tests.Types",
            "members": [
                { "kind": "operation", "name": "VoidMethod" },
                {
                    "kind": "operation",
                    "name": "Load",
                    "params": [
                        { "name": "index", "type": { "namespace": "System", "name": "Int32" } }
                    ],
                    "returns": { "namespace": "System", "name": "Int32" }
                },
                {
                    "kind": "accessor",
                    "name": "Name",
                    "type": { "namespace": "System", "name": "String" },
                    "writable": false
                },
                {
                    "kind": "notification",
                    "name": "Changed",
                    "handler": { "namespace": "System", "name": "EventHandler" },
                    "payload": { "namespace": "System", "name": "EventArgs" }
                }
            ]
        },
        {
            "name": "Importer",
            "namespace": "Tests.Types",
            "kind": "extensible_class",
            "members": [
                { "kind": "constructor" },
                {
                    "kind": "operation",
                    "name": "Run",
                    "dispatch": "virtual",
                    "returns": { "namespace": "System", "name": "Int32" }
                }
            ]
        }
    ]
}"#;

fn write_fixture(dir: &std::path::Path) -> String {
    let path = dir.join("contracts.json");
    std::fs::write(&path, CONTRACTS).unwrap();
    path.display().to_string()
}

#[test]
fn contract_set_deserializes_from_json() {
    let set: doppel_ir::ContractSet = serde_json::from_str(CONTRACTS).unwrap();
    assert_eq!(set.contracts.len(), 2);
    assert_eq!(set.contracts[0].name, "IExample");
    assert_eq!(set.contracts[0].members.len(), 4);
    assert_eq!(
        set.contracts[1].kind,
        doppel_ir::ContractKind::ExtensibleClass
    );
}

#[test]
fn generate_writes_three_artifacts_per_capability_contract() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out = dir.path().join("out");

    commands::generate(
        &input,
        &["IExample".to_string()],
        &OutputOptions {
            out_dir: out.clone(),
        },
    )
    .unwrap();

    for name in ["StubExample.cs", "CompositeExample.cs", "ExampleDecorator.cs"] {
        let text = std::fs::read_to_string(out.join(name)).unwrap();
        assert!(text.starts_with("// this file was created by doppel\n"));
        assert!(text.contains("namespace Tests.Types"));
    }
}

#[test]
fn generate_without_names_covers_every_contract() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out = dir.path().join("out");

    commands::generate(
        &input,
        &[],
        &OutputOptions {
            out_dir: out.clone(),
        },
    )
    .unwrap();

    assert!(out.join("StubExample.cs").exists());
    assert!(out.join("StubImporter.cs").exists());
    let bridge = std::fs::read_to_string(out.join("StubImporter.cs")).unwrap();
    assert!(bridge.contains("public class StubImporter : IntermediateStubImporter_DoNotUse"));
    assert!(bridge.contains("public class IntermediateStubImporter_DoNotUse : Importer"));
}

#[test]
fn unknown_contract_name_fails_after_processing_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out = dir.path().join("out");

    let result = commands::generate(
        &input,
        &["IExample".to_string(), "IMissing".to_string()],
        &OutputOptions {
            out_dir: out.clone(),
        },
    );

    assert!(result.is_err());
    // The known contract is still generated.
    assert!(out.join("StubExample.cs").exists());
}

#[test]
fn support_command_writes_delegation_sources() {
    let dir = tempfile::tempdir().unwrap();

    commands::write_support(&OutputOptions {
        out_dir: dir.path().to_path_buf(),
    })
    .unwrap();

    for name in [
        "PropertyImplementation.cs",
        "EventImplementation.cs",
        "EnumerableEqualityComparer.cs",
        "DelayedConstruction.cs",
    ] {
        let text = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(text.contains("namespace System.Delegation"));
    }
}

#[test]
fn malformed_input_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = commands::list(&path.display().to_string());
    assert!(matches!(
        result,
        Err(commands::CommandError::ParseInput { .. })
    ));
}
