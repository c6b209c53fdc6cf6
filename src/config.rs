//! Validator configuration
//!
//! Settings come from defaults, an optional TOML file and command-line flags,
//! in increasing order of precedence. The directory holding the standard
//! definition tables falls back to `ODIMH5_VALIDATOR_CSV_DIR`.
//!
//! ```toml
//! check_optional = true
//! check_extras = false
//! verbosity = "warnings_only"
//! csv_dir = "/usr/share/odimh5-validator"
//! ```

use crate::compliance::CheckOptions;
use crate::container::AttrValue;
use crate::error::{OdimError, Result};
use crate::report::Verbosity;
use crate::store::AttributeStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the standard definition table directory
pub const CSV_DIR_ENV: &str = "ODIMH5_VALIDATOR_CSV_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub check_optional: bool,
    pub check_extras: bool,
    pub verbosity: Verbosity,
    /// Directory of standard definition tables
    pub csv_dir: Option<PathBuf>,
}

impl ValidatorConfig {
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::new()
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| OdimError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            check_optional: self.check_optional,
            check_extras: self.check_extras,
            verbosity: self.verbosity,
        }
    }

    /// Table directory: configured value, else the environment
    pub fn csv_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.csv_dir {
            return Ok(dir.clone());
        }
        std::env::var_os(CSV_DIR_ENV)
            .map(PathBuf::from)
            .ok_or_else(|| OdimError::Config(format!("{} is not set", CSV_DIR_ENV)))
    }

    /// Standard definition table matching a container.
    ///
    /// With `version` (e.g. `2.2`) the table is `ODIM_H5_V2_2_<object>.csv`,
    /// otherwise the container's `/Conventions` names it, as in
    /// `ODIM_H5_V2_2_PVOL.csv` for `ODIM_H5/V2_2`.
    pub fn rule_table_path<S: AttributeStore + ?Sized>(
        &self,
        store: &S,
        version: Option<&str>,
    ) -> Result<PathBuf> {
        let dir = self.csv_dir()?;
        let object = text_attribute(store, "/what/object")?;
        let conventions = match version {
            Some(_) => None,
            None => Some(text_attribute(store, "/Conventions")?),
        };
        rule_table_path_in(&dir, conventions.as_deref(), version, &object)
    }
}

/// File name logic of [`ValidatorConfig::rule_table_path`]
pub fn rule_table_path_in(
    dir: &Path,
    conventions: Option<&str>,
    version: Option<&str>,
    object: &str,
) -> Result<PathBuf> {
    let stem = match (version, conventions) {
        (Some(version), _) => format!("ODIM_H5_V{}", version.trim().replace('.', "_")),
        (None, Some(conventions)) => conventions.trim().replace('/', "_"),
        (None, None) => {
            return Err(OdimError::Config(
                "neither a version nor /Conventions is available".to_string(),
            ))
        }
    };
    Ok(dir.join(format!("{}_{}.csv", stem, object.trim())))
}

fn text_attribute<S: AttributeStore + ?Sized>(store: &S, path: &str) -> Result<String> {
    match store.raw_attribute_value(path) {
        Ok(AttrValue::String(text)) => Ok(text),
        Ok(_) => Err(OdimError::WrongType {
            path: path.to_string(),
            expected: "a string".to_string(),
        }),
        Err(OdimError::NotFound(_)) => Err(OdimError::Config(format!(
            "{} is missing, cannot pick a standard definition table",
            path
        ))),
        Err(e) => Err(e),
    }
}

/// Builder for [`ValidatorConfig`]
///
/// ```rust
/// use odimh5_rs::{ValidatorConfig, Verbosity};
///
/// let config = ValidatorConfig::builder()
///     .check_optional(true)
///     .verbosity(Verbosity::WarningsOnly)
///     .build();
/// assert!(config.check_optional);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one read from a file
    pub fn from_config(config: ValidatorConfig) -> Self {
        ValidatorConfigBuilder { config }
    }

    pub fn check_optional(mut self, enabled: bool) -> Self {
        self.config.check_optional = enabled;
        self
    }

    pub fn check_extras(mut self, enabled: bool) -> Self {
        self.config.check_extras = enabled;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    pub fn csv_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.csv_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}
