//! # odimh5-rs - ODIM_H5 compliance checking and repair
//!
//! Checks radar data containers against a tabular standard definition and
//! repairs the metadata of non-compliant ones:
//!
//! - **Standard definitions** read from semicolon-separated tables, one rule
//!   per row, with regular-expression node patterns
//! - **Value constraints** in a small expression language (`=1.254+-0.002`,
//!   `>0&&<1`, `min>=0&&max<360`) or as regular expressions for strings
//! - **Repair** of a verbatim copy: missing groups, missing or wrong
//!   attribute values, non-standard datatypes, with an audit trail in
//!   `/how/metadata_changed`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use odimh5_rs::{validate_file, CheckOptions, Result, Ruleset};
//!
//! # fn main() -> Result<()> {
//! let standard = Ruleset::read_csv("ODIM_H5_V2_2_PVOL.csv")?;
//! let mut failed = Ruleset::new();
//! let compliant = validate_file("volume.odh", &standard, &CheckOptions::default(), Some(&mut failed))?;
//!
//! if !compliant {
//!     // feed the failures back as corrections
//!     failed.write_csv("failed.csv")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Repair
//!
//! ```rust,no_run
//! use odimh5_rs::{correct, Result, Ruleset, Verbosity};
//!
//! # fn main() -> Result<()> {
//! let corrections = Ruleset::read_csv("corrections.csv")?;
//! let changed = correct("in.odh", "out.odh", &corrections, Verbosity::Info)?;
//! println!("{} nodes changed", changed.len());
//! # Ok(())
//! # }
//! ```

pub mod compliance;
pub mod config;
pub mod container;
pub mod error;
pub mod expr;
pub mod pattern;
pub mod repair;
pub mod report;
pub mod standard;
pub mod store;

pub use compliance::{check_attribute_value, compare, validate_file, CheckOptions};
pub use config::{ValidatorConfig, ValidatorConfigBuilder, CSV_DIR_ENV};
pub use container::{AttrValue, Attribute, Container, ContainerFile, Datatype, Dataspace};
pub use error::{OdimError, Result};
pub use expr::check_value;
pub use pattern::PathMatcher;
pub use repair::{correct, ChangeLog, METADATA_CHANGED};
pub use report::{log_filter, Verbosity};
pub use standard::{Category, Entry, EntryType, Ruleset};
pub use store::{
    AttributeStore, AttributeStoreMut, MatchSet, StoreReader, StoreSnapshot, StoreWriter,
};
