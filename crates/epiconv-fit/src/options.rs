//! Per-request fit options

use crate::family::ObservationFamily;
use epiconv_models::{FormulaOverrides, PriorOverrides};
use serde::{Deserialize, Serialize};

/// Options for a one-call fit from prepared data
///
/// Everything left at its default resolves to the family defaults: intercept-only
/// sub-parameter formulas, the family's default priors and a negative binomial
/// observation model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Observation model
    pub family: ObservationFamily,
    /// Prior hyperparameter overrides per sub-parameter
    pub priors: PriorOverrides,
    /// Formula overrides per sub-parameter
    pub formula: FormulaOverrides,
    /// Return the program text instead of fitting
    pub dry: bool,
}

impl FitOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observation family.
    pub const fn family(mut self, family: ObservationFamily) -> Self {
        self.family = family;
        self
    }

    /// Set prior overrides.
    pub fn priors(mut self, priors: PriorOverrides) -> Self {
        self.priors = priors;
        self
    }

    /// Set formula overrides.
    pub fn formula(mut self, formula: FormulaOverrides) -> Self {
        self.formula = formula;
        self
    }

    /// Request a dry run.
    pub const fn dry_run(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }
}
