//! User-facing notices
//!
//! Informational notices (optional entry missing, undocumented content) can
//! be suppressed; warnings (wrong type, wrong value, missing mandatory entry)
//! are always emitted.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// Log filter for the command-line tools.
///
/// `directives` (normally `RUST_LOG`) is used as given, so it can narrow the
/// output below the default as well as widen it.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// How much to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Informational notices and warnings
    #[default]
    Info,
    /// Warnings only
    WarningsOnly,
}

impl Verbosity {
    pub fn from_no_info(no_info: bool) -> Self {
        if no_info {
            Verbosity::WarningsOnly
        } else {
            Verbosity::Info
        }
    }

    pub fn prints_info(&self) -> bool {
        *self == Verbosity::Info
    }

    pub fn info(&self, message: impl AsRef<str>) {
        if self.prints_info() {
            tracing::info!("{}", message.as_ref());
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        tracing::warn!("{}", message.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_no_info() {
        assert_eq!(Verbosity::from_no_info(true), Verbosity::WarningsOnly);
        assert!(Verbosity::from_no_info(false).prints_info());
        assert!(Verbosity::default().prints_info());
    }

    #[test]
    fn test_log_filter_honours_narrower_level() {
        let narrow = log_filter(Some("warn")).to_string();
        assert!(narrow.contains("warn"));
        assert!(!narrow.contains("info"));

        assert_eq!(log_filter(None).to_string(), DEFAULT_LOG_DIRECTIVE);
    }
}
