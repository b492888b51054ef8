//! Error types for model assembly.

use epiconv_data::DataError;
use thiserror::Error;

/// Result type for model assembly.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by the registry and by model families.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No family is registered under the requested tag
    #[error("Unknown model family '{requested}' (known: {})", .known.join(", "))]
    UnknownModelFamily {
        /// Tag that was requested
        requested: String,
        /// Tags that are registered
        known: Vec<String>,
    },

    /// A family with this tag is already registered
    #[error("Model family '{tag}' is already registered")]
    DuplicateFamily {
        /// Conflicting tag
        tag: String,
    },

    /// Family tags must be non-empty lowercase identifiers
    #[error("Invalid model family tag '{tag}': {reason}")]
    InvalidFamilyTag {
        /// Rejected tag
        tag: String,
        /// Why the tag was rejected
        reason: String,
    },

    /// A family failed its registration checks
    #[error("Model family '{tag}' is incomplete: {reason}")]
    IncompleteFamily {
        /// Family tag
        tag: String,
        /// Missing or inconsistent capability
        reason: String,
    },

    /// A hyperparameter or formula override is invalid for the family
    #[error("Invalid parameter '{name}' for model family '{family}': {reason}")]
    InvalidParameter {
        /// Family tag
        family: String,
        /// Sub-parameter name
        name: String,
        /// Why the override was rejected
        reason: String,
    },

    /// Data preparation error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
