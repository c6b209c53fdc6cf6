//! odimh5-validate
//!
//! Checks a container against an ODIM_H5 standard definition table.
//! Exits 0 when compliant, -1 when not, 1 on error.

use anyhow::{Context, Result};
use clap::Parser;
use odimh5_rs::{
    compare, log_filter, Ruleset, StoreReader, StoreSnapshot, ValidatorConfig, ValidatorConfigBuilder,
    Verbosity,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "odimh5-validate")]
#[command(about = "Check an ODIM_H5 container against a standard definition table")]
struct Args {
    /// Container to check
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Standard definition table (default: picked from /Conventions)
    #[arg(short = 'c', long = "csv", conflicts_with = "version")]
    csv: Option<PathBuf>,

    /// Standard version to check against, e.g. 2.2
    #[arg(short = 'v', long = "version")]
    version: Option<String>,

    /// Also check optional entries
    #[arg(long = "checkOptional")]
    check_optional: bool,

    /// Report content the table does not document
    #[arg(long = "checkExtras")]
    check_extras: bool,

    /// Print warnings only
    #[arg(long = "noInfo")]
    no_info: bool,

    /// Write failed entries to this table
    #[arg(long = "failedEntries")]
    failed_entries: Option<PathBuf>,

    /// Table of possible values layered over the standard definition
    #[arg(long = "valuesCsv")]
    values_csv: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(-1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<bool> {
    let base = match &args.config {
        Some(path) => ValidatorConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    let mut builder = ValidatorConfigBuilder::from_config(base.clone())
        .check_optional(base.check_optional || args.check_optional)
        .check_extras(base.check_extras || args.check_extras);
    if args.no_info {
        builder = builder.verbosity(Verbosity::WarningsOnly);
    }
    let config = builder.build();

    let store = StoreReader::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let table = match &args.csv {
        Some(path) => path.clone(),
        None => config
            .rule_table_path(&*store, args.version.as_deref())
            .context("Cannot locate the standard definition table")?,
    };
    config
        .verbosity
        .info(format!("Using standard definition {}", table.display()));

    let mut standard = Ruleset::read_csv(&table)
        .with_context(|| format!("Failed to read {}", table.display()))?;
    if let Some(values) = &args.values_csv {
        standard
            .update_with_csv(values)
            .with_context(|| format!("Failed to read {}", values.display()))?;
    }

    let snapshot = StoreSnapshot::capture(&*store);
    let mut failed = Ruleset::new();
    let compliant = compare(
        &*store,
        &snapshot,
        &standard,
        &config.check_options(),
        Some(&mut failed),
    )?;

    if let Some(path) = &args.failed_entries {
        failed
            .write_csv(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("{} failed entries written to {}", failed.len(), path.display());
    }

    if compliant {
        config
            .verbosity
            .info(format!("{} is compliant", args.input.display()));
    } else {
        config
            .verbosity
            .warn(format!("{} is NOT compliant", args.input.display()));
    }
    Ok(compliant)
}
