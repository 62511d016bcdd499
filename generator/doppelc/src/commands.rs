//! CLI subcommands: generate, support, list.

use std::fs;
use std::path::{Path, PathBuf};

use doppel_ir::{ContractDecl, ContractSet};
use doppel_synth::support::support_sources;
use doppel_synth::synthesize_all;
use thiserror::Error;

/// A failure that stops a whole command.
///
/// Per-contract synthesis failures do not stop the run; they are reported,
/// the remaining contracts are processed, and the command ends with
/// [`CommandError::ContractsFailed`].
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unable to read `{path}`: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{path}` is not a valid contract set: {source}")]
    ParseInput {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to write `{path}`: {source}")]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} requested contracts failed")]
    ContractsFailed { failed: usize, total: usize },
}

/// Options shared by the artifact-writing commands.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory artifacts are written into; created if missing.
    pub out_dir: PathBuf,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
        }
    }
}

/// Load a contract set from a JSON document.
pub fn load_contract_set(path: &str) -> Result<ContractSet, CommandError> {
    let text = fs::read_to_string(path).map_err(|source| CommandError::ReadInput {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CommandError::ParseInput {
        path: path.to_string(),
        source,
    })
}

/// Synthesize all patterns for the named contracts, or for every contract in
/// the set when no names are given.
///
/// Unknown names are reported with near-miss candidates and counted as
/// failures; synthesis continues for everything else.
pub fn generate(
    path: &str,
    type_names: &[String],
    options: &OutputOptions,
) -> Result<(), CommandError> {
    let set = load_contract_set(path)?;
    ensure_out_dir(&options.out_dir)?;

    let selected: Vec<Selection<'_>> = if type_names.is_empty() {
        set.contracts.iter().map(Selection::Found).collect()
    } else {
        type_names
            .iter()
            .map(|name| match set.find(name) {
                Some(contract) => Selection::Found(contract),
                None => Selection::Missing(name),
            })
            .collect()
    };

    let total = selected.len();
    let mut failed = 0usize;
    let mut generated = 0usize;

    for selection in selected {
        let contract = match selection {
            Selection::Found(contract) => contract,
            Selection::Missing(name) => {
                eprintln!("Unable to find contract {name} in {path}.");
                let similar = set.similar(name);
                if !similar.is_empty() {
                    eprintln!("Found these similar names:");
                    for candidate in similar {
                        eprintln!("   {candidate}");
                    }
                }
                failed += 1;
                continue;
            }
        };

        match synthesize_all(contract) {
            Ok(artifacts) => {
                for artifact in artifacts {
                    println!("Generating {} ...", artifact.file_name);
                    write_file(&options.out_dir.join(&artifact.file_name), &artifact.text)?;
                }
                generated += 1;
            }
            Err(error) => {
                eprintln!("Skipping {}: {error}", contract.name);
                failed += 1;
            }
        }
    }

    tracing::info!(generated, failed, "generation finished");
    println!("Done generating implementations from {generated} contracts.");

    if failed > 0 {
        return Err(CommandError::ContractsFailed { failed, total });
    }
    Ok(())
}

/// Write the delegation support-library sources.
pub fn write_support(options: &OutputOptions) -> Result<(), CommandError> {
    ensure_out_dir(&options.out_dir)?;
    for source in support_sources() {
        println!("Generating {} ...", source.file_name);
        write_file(&options.out_dir.join(source.file_name), source.text)?;
    }
    Ok(())
}

/// Print every contract name in the set.
pub fn list(path: &str) -> Result<(), CommandError> {
    let set = load_contract_set(path)?;
    for contract in &set.contracts {
        println!("{}", describe(contract));
    }
    Ok(())
}

enum Selection<'a> {
    Found(&'a ContractDecl),
    Missing(&'a str),
}

fn describe(contract: &ContractDecl) -> String {
    let kind = match contract.kind {
        doppel_ir::ContractKind::Capability => "capability",
        doppel_ir::ContractKind::ExtensibleClass => "class",
    };
    match &contract.namespace {
        Some(ns) => format!("{ns}.{}{} ({kind})", contract.name, contract.arity_marker()),
        None => format!("{}{} ({kind})", contract.name, contract.arity_marker()),
    }
}

fn ensure_out_dir(dir: &Path) -> Result<(), CommandError> {
    fs::create_dir_all(dir).map_err(|source| CommandError::WriteOutput {
        path: dir.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, text: &str) -> Result<(), CommandError> {
    fs::write(path, text).map_err(|source| CommandError::WriteOutput {
        path: path.display().to_string(),
        source,
    })
}
