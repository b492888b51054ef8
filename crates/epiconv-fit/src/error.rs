//! Error types for fit orchestration.

use crate::engine::EngineError;
use crate::request::FitContext;
use epiconv_models::ModelError;
use thiserror::Error;

/// Result type for fit orchestration.
pub type Result<T> = std::result::Result<T, FitError>;

/// Errors raised while assembling or running a fit.
#[derive(Debug, Error)]
pub enum FitError {
    /// A mandatory request component was neither supplied nor defaulted
    #[error("Missing model specification: no {component} supplied")]
    MissingModelSpecification {
        /// One of `data`, `formula`, `family`, `priors`, `stancode`
        component: &'static str,
    },

    /// The formula reads a column the prepared data lacks
    #[error("Formula reads column '{column}' which is not in the prepared data")]
    MissingDataColumn {
        /// Column named by the formula
        column: String,
    },

    /// The formula's transform is not defined by any Stan fragment
    #[error("Formula transform '{transform}' is not defined by any Stan fragment")]
    UndefinedTransform {
        /// Transform function name
        transform: String,
    },

    /// Observation family name could not be parsed
    #[error("Unknown observation family '{requested}' (known: poisson, negbinomial)")]
    UnknownObservationFamily {
        /// Name that was requested
        requested: String,
    },

    /// The inference engine raised an error; returned unchanged with its inputs
    #[error("Inference engine failed for {context}: {source}")]
    EngineFailure {
        /// Error raised by the engine
        #[source]
        source: EngineError,
        /// Exact inputs handed to the engine
        context: Box<FitContext>,
    },

    /// Model assembly error
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_component_named() {
        let err = FitError::MissingModelSpecification {
            component: "priors",
        };
        assert_eq!(
            err.to_string(),
            "Missing model specification: no priors supplied"
        );
    }
}
