//! Development task runner for the narration text workspace.
//!
//! # Usage
//!
//! ```bash
//! # Run all workspace tests
//! cargo xtask test
//!
//! # Run the golden fixture parity gate
//! cargo xtask parity
//!
//! # Regenerate golden files after an intended extraction change
//! cargo xtask bless
//! ```

mod fixtures;

use anyhow::{Context, Result};
use std::env;
use std::process::{Command, ExitCode};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    match args[0].as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        "test" => {
            let mut cargo_args = vec!["test", "--workspace"];
            for arg in &args[1..] {
                cargo_args.push(arg);
            }
            run_cargo(&cargo_args)
        }
        "parity" => {
            let dir = fixtures::fixtures_dir()?;
            let stale = fixtures::bless(&dir, true)?;
            if !stale.is_empty() {
                eprintln!("Golden files out of date:");
                for fixture in &stale {
                    eprintln!("  {}", fixture.display());
                }
                eprintln!("\nIf the extraction change is intended, run: cargo xtask bless");
                return Ok(ExitCode::FAILURE);
            }
            run_cargo(&["test", "-p", "narration-text", "--test", "parity"])
        }
        "bless" => {
            let dir = fixtures::fixtures_dir()?;
            let changed = fixtures::bless(&dir, false)?;
            if changed.is_empty() {
                eprintln!("All golden files are current.");
            } else {
                for fixture in &changed {
                    eprintln!("Updated {}", fixture.with_extension("json").display());
                }
                eprintln!("\nRegenerate narration for affected content: word indices may have moved.");
            }
            Ok(ExitCode::SUCCESS)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_usage() {
    eprintln!(
        r#"xtask - Development tasks for the narration text workspace

USAGE:
    cargo xtask <COMMAND>

COMMANDS:
    test      Run all workspace tests (extra args are passed to cargo)
    parity    Check golden fixtures and run the parity test suite
    bless     Regenerate golden fixture files from the current extractor
    help      Show this help message

EXAMPLES:
    cargo xtask test              # Run tests
    cargo xtask parity            # CI parity gate
    cargo xtask bless             # Accept an intended extraction change
"#
    );
}

fn run_cargo(args: &[&str]) -> Result<ExitCode> {
    eprintln!("Running: cargo {}", args.join(" "));

    let status = Command::new("cargo")
        .args(args)
        .status()
        .context("Failed to run cargo")?;

    if status.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(status.code().unwrap_or(1) as u8))
    }
}
