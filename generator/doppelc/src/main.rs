//! Doppel CLI entry point.
//!
//! Reads a contract-set JSON document and writes Stub, Composite, Decorator,
//! and class-bridge implementations for the contracts it describes.

use std::path::PathBuf;

use doppelc::commands::{self, OutputOptions};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "generate" => {
            if args.len() < 3 {
                eprintln!("Usage: doppel generate <contracts.json> [TYPE ...] [--out-dir=DIR]");
                std::process::exit(1);
            }

            let mut options = OutputOptions::default();
            let mut type_names: Vec<String> = Vec::new();
            for arg in args.iter().skip(3) {
                if let Some(dir) = arg.strip_prefix("--out-dir=") {
                    options.out_dir = PathBuf::from(dir);
                } else if arg.starts_with('-') {
                    eprintln!("error: unknown option `{arg}`");
                    std::process::exit(1);
                } else {
                    type_names.push(arg.clone());
                }
            }

            if let Err(error) = commands::generate(&args[2], &type_names, &options) {
                eprintln!("error: {error}");
                std::process::exit(1);
            }
        }
        "support" => {
            let mut options = OutputOptions::default();
            for arg in args.iter().skip(2) {
                if let Some(dir) = arg.strip_prefix("--out-dir=") {
                    options.out_dir = PathBuf::from(dir);
                } else {
                    eprintln!("error: unknown option `{arg}`");
                    std::process::exit(1);
                }
            }

            if let Err(error) = commands::write_support(&options) {
                eprintln!("error: {error}");
                std::process::exit(1);
            }
        }
        "list" => {
            if args.len() < 3 {
                eprintln!("Usage: doppel list <contracts.json>");
                std::process::exit(1);
            }

            if let Err(error) = commands::list(&args[2]) {
                eprintln!("error: {error}");
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("doppel - synthesize Stub, Composite, and Decorator implementations");
    eprintln!();
    eprintln!("Usage: doppel <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate <contracts.json> [TYPE ...] [--out-dir=DIR]");
    eprintln!("      Generate implementations for the named contract types,");
    eprintln!("      or for every contract in the set when none are named.");
    eprintln!("  support [--out-dir=DIR]");
    eprintln!("      Write the System.Delegation support-library sources.");
    eprintln!("  list <contracts.json>");
    eprintln!("      Print the contracts described by the set.");
    eprintln!();
    eprintln!("Set RUST_LOG to control log verbosity, e.g. RUST_LOG=doppel_synth=debug.");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
