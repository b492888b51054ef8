//! Error types for data preparation.

use thiserror::Error;

/// Result type for data preparation.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while resolving, windowing or coercing observations.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column role could not be resolved from the input columns
    #[error("Missing required column for role '{role}'{}", column_hint(.column))]
    MissingRequiredColumn {
        /// Role that could not be resolved (`location`, `date`, `primary`, `secondary`)
        role: &'static str,
        /// Override column name that was requested but not found, if any
        column: Option<String>,
    },

    /// A preparation parameter is out of its domain or not a whole number
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A count or index value cannot be represented as an integer without loss
    #[error("Column '{column}' row {row}: value {value} is not representable as an integer")]
    NonIntegerValue {
        /// Column holding the value
        column: String,
        /// Zero-based row position
        row: usize,
        /// Offending value, rendered for display
        value: String,
    },

    /// A required cell is null
    #[error("Column '{column}' row {row}: value is missing")]
    NullValue {
        /// Column holding the null
        column: String,
        /// Zero-based row position
        row: usize,
    },

    /// A count column holds a negative value
    #[error("Column '{column}' row {row}: count {value} is negative")]
    NegativeCount {
        /// Column holding the value
        column: String,
        /// Zero-based row position
        row: usize,
        /// Offending count
        value: i64,
    },

    /// A date cell could not be parsed as an ISO calendar date
    #[error("Row {row}: '{value}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate {
        /// Zero-based row position
        row: usize,
        /// Raw cell contents
        value: String,
    },

    /// The date column's type is neither a date nor text
    #[error("Column '{column}' has type {dtype}; expected a date or YYYY-MM-DD strings")]
    UnsupportedDateType {
        /// Column name
        column: &'static str,
        /// Type found in the input
        dtype: String,
    },

    /// The same (location, date) pair appears more than once
    #[error("Duplicate observation for location '{location}' on {date}")]
    DuplicateObservation {
        /// Location label
        location: String,
        /// Repeated date
        date: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn column_hint(column: &Option<String>) -> String {
    column
        .as_ref()
        .map_or_else(String::new, |c| format!(" (column '{c}' not found)"))
}

impl DataError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_names_role() {
        let err = DataError::MissingRequiredColumn {
            role: "primary",
            column: None,
        };
        assert_eq!(err.to_string(), "Missing required column for role 'primary'");
    }

    #[test]
    fn test_missing_column_names_override() {
        let err = DataError::MissingRequiredColumn {
            role: "secondary",
            column: Some("deaths".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("'secondary'"));
        assert!(msg.contains("'deaths'"));
    }
}
