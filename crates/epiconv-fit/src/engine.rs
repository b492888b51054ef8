//! Inference engine seam

use crate::request::FitRequest;

/// Error type engines report failures with
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// External Bayesian inference engine.
///
/// Receives the complete request (prepared data, formula, observation family,
/// priors and Stan fragments) and returns an engine-defined fitted model. A
/// call is a single blocking attempt; timeouts and cancellation belong to the
/// caller.
pub trait InferenceEngine {
    /// Fitted model handle
    type Fit;

    /// Fit the model described by `request`.
    fn fit(&self, request: &FitRequest) -> Result<Self::Fit, EngineError>;
}
