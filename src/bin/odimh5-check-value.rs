//! odimh5-check-value
//!
//! Checks one attribute against an assumed value.
//! Exits 0 on a match, -1 on a mismatch, 1 on error.

use anyhow::{Context, Result};
use clap::Parser;
use odimh5_rs::{check_attribute_value, log_filter, EntryType, StoreReader, Verbosity};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "odimh5-check-value")]
#[command(about = "Check the value of a single ODIM_H5 attribute")]
struct Args {
    /// Container to read
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Attribute path, e.g. /how/highprf
    #[arg(short = 'a', long = "attribute")]
    attribute: String,

    /// Assumed value: a regular expression for strings, an expression such
    /// as "=1.254+-0.002" for numbers
    #[arg(short = 'v', long = "value", allow_hyphen_values = true)]
    value: String,

    /// Expected datatype, e.g. "real" or "integer array"
    #[arg(short = 't', long = "type", value_parser = parse_type)]
    entry_type: Option<EntryType>,

    /// Print warnings only
    #[arg(long = "noInfo")]
    no_info: bool,
}

fn parse_type(text: &str) -> std::result::Result<EntryType, String> {
    EntryType::parse(text).map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .init();

    match run(&Args::parse()) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(-1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let store = StoreReader::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let matched = check_attribute_value(
        &*store,
        &args.attribute,
        &args.value,
        args.entry_type,
        Verbosity::from_no_info(args.no_info),
    )?;
    Ok(matched)
}
