//! odimh5-correct
//!
//! Copies a container and applies a table of corrections to the copy.

use anyhow::{Context, Result};
use clap::Parser;
use odimh5_rs::{correct, log_filter, Ruleset, Verbosity};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "odimh5-correct")]
#[command(about = "Write a corrected copy of an ODIM_H5 container")]
struct Args {
    /// Container to correct (left untouched)
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Corrected copy
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Table of desired entries
    #[arg(short = 'c', long = "csv")]
    csv: PathBuf,

    /// Print warnings only
    #[arg(long = "noInfo")]
    no_info: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .init();

    if let Err(e) = run(&Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let corrections = Ruleset::read_csv(&args.csv)
        .with_context(|| format!("Failed to read {}", args.csv.display()))?;

    let changed = correct(
        &args.input,
        &args.output,
        &corrections,
        Verbosity::from_no_info(args.no_info),
    )
    .with_context(|| {
        format!(
            "Failed to correct {} into {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    info!(
        "{} written, {} nodes changed",
        args.output.display(),
        changed.len()
    );
    Ok(())
}
