//! Result and error types for PLR.

use thiserror::Error;

/// Result type for PLR operations
pub type PlrResult<T> = Result<T, PlrError>;

/// Errors that can occur in PLR
#[derive(Debug, Error)]
pub enum PlrError {
    /// Snapshot is not a valid tree (root or child is not an object)
    #[error("Invalid tree input at {path}: {message}")]
    InvalidTreeInput {
        /// Location of the offending value, e.g. `/children/2`
        path: String,
        /// Error message
        message: String,
    },

    /// Edit mapping references something other than a node of the input trees
    #[error("Edit mapping invariant violated: {message}")]
    MappingTypeViolation {
        /// Error message
        message: String,
    },

    /// Cost model returned a negative or non-finite cost
    #[error("Cost model returned invalid {operation} cost: {cost}")]
    InvalidCost {
        /// Operation that produced the cost (insert, delete, rename)
        operation: &'static str,
        /// Offending value
        cost: f64,
    },

    /// Attribute value cannot be written as a selector literal
    #[error("Value cannot be quoted in a selector literal: {value}")]
    UnquotableLiteral {
        /// Offending value
        value: String,
    },

    /// Configuration is out of range or malformed
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PlrError {
    /// Create an invalid tree input error
    #[must_use]
    pub fn invalid_tree(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTreeInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a mapping invariant error
    #[must_use]
    pub fn mapping_violation(message: impl Into<String>) -> Self {
        Self::MappingTypeViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
