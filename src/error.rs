//! Error types for compliance checking and repair

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, OdimError>;

/// Errors raised while loading standard definitions, reading containers,
/// evaluating constraints or repairing files.
///
/// Two families exist. Configuration errors describe bad input supplied by the
/// user (rule tables, expressions, correction values) and are always fatal.
/// Store errors describe problems accessing the container itself; of those only
/// [`OdimError::BadEncoding`] is considered non-fatal by the compliance engine.
#[derive(Error, Debug)]
pub enum OdimError {
    /// A rule table row could not be understood
    #[error("Invalid standard definition entry: {0}")]
    InvalidEntry(String),

    /// A node pattern is not a valid regular expression
    #[error("Invalid node pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A possible-values expression could not be parsed or evaluated
    #[error("Invalid value expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// A correction value cannot be turned into an attribute value
    #[error("Invalid value '{value}' for {node}: {reason}")]
    InvalidValue {
        node: String,
        value: String,
        reason: String,
    },

    /// The requested operation is not supported for this entry
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// File exists but is not a container this crate can read
    #[error("Not a valid container file: {path} ({reason})")]
    NotAContainer { path: String, reason: String },

    /// File could not be opened
    #[error("Cannot open {path}: {reason}")]
    NotOpened { path: String, reason: String },

    /// Group, dataset or attribute does not exist
    #[error("No such node: {0}")]
    NotFound(String),

    /// Attribute holds a value of another type than the one requested
    #[error("{path} is not {expected}")]
    WrongType { path: String, expected: String },

    /// Attribute is readable but encoded in a non-standard way
    #[error("Non-standard encoding of {path}: {reason}")]
    BadEncoding { path: String, reason: String },

    #[error("Dataspace {dims:?} holds more elements than can be addressed")]
    DataspaceOverflow { dims: Vec<u64> },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rule table could not be read or written
    #[error("Standard definition table error: {0}")]
    Csv(#[from] csv::Error),
}

impl OdimError {
    /// Errors caused by user-supplied configuration (always fatal)
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            OdimError::InvalidEntry(_)
                | OdimError::InvalidPattern { .. }
                | OdimError::InvalidExpression { .. }
                | OdimError::InvalidValue { .. }
                | OdimError::Unsupported(_)
                | OdimError::Config(_)
                | OdimError::Csv(_)
        )
    }

    /// Errors caused by accessing the container
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            OdimError::NotAContainer { .. }
                | OdimError::NotOpened { .. }
                | OdimError::NotFound(_)
                | OdimError::WrongType { .. }
                | OdimError::BadEncoding { .. }
                | OdimError::DataspaceOverflow { .. }
                | OdimError::Io(_)
                | OdimError::Serialization(_)
        )
    }

    /// Store complaints the compliance engine reports as a warning instead of aborting
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, OdimError::BadEncoding { .. })
    }

    pub(crate) fn expression(expression: &str, reason: impl Into<String>) -> Self {
        OdimError::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn value(node: &str, value: &str, reason: impl Into<String>) -> Self {
        OdimError::InvalidValue {
            node: node.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
