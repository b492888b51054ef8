//! Fit Orchestrator

use crate::engine::InferenceEngine;
use crate::error::{FitError, Result};
use crate::request::FitRequest;

/// Result of [`fit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitOutcome<F> {
    /// Fitted model returned by the engine
    Fitted(F),
    /// Assembled program text; the engine was not called
    DryRun(String),
}

impl<F> FitOutcome<F> {
    /// Whether this outcome came from a dry run
    pub const fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun(_))
    }

    /// Program text of a dry run.
    pub fn program(&self) -> Option<&str> {
        match self {
            Self::DryRun(text) => Some(text.as_str()),
            Self::Fitted(_) => None,
        }
    }

    /// Fitted model, if the engine was run.
    pub fn into_fitted(self) -> Option<F> {
        match self {
            Self::Fitted(fit) => Some(fit),
            Self::DryRun(_) => None,
        }
    }
}

/// Fit `request` with `engine`, or return its program text when `dry` is set.
///
/// The engine is called at most once. Its error is returned unchanged inside
/// [`FitError::EngineFailure`] along with the formula, observation family,
/// priors and Stan fragments it was given.
pub fn fit<E>(engine: &E, request: &FitRequest, dry: bool) -> Result<FitOutcome<E::Fit>>
where
    E: InferenceEngine + ?Sized,
{
    if dry {
        tracing::info!(
            family = %request.family(),
            fragments = request.stancode().fragments.len(),
            "dry run, returning program text"
        );
        return Ok(FitOutcome::DryRun(request.program_text()));
    }

    tracing::info!(
        family = %request.family(),
        rows = request.data().height(),
        "invoking inference engine"
    );
    match engine.fit(request) {
        Ok(fit) => Ok(FitOutcome::Fitted(fit)),
        Err(source) => {
            tracing::warn!(%source, "inference engine failed");
            Err(FitError::EngineFailure {
                source,
                context: Box::new(request.context()),
            })
        }
    }
}
