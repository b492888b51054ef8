//! Composite non-linear formulas
//!
//! A formula relates an outcome column to a named transform of data columns
//! and sub-parameters, with one linear predictor per sub-parameter:
//!
//! ```text
//! secondary ~ epiconv_convolve(primary, scale, cmean, lcsd, cmax, index, cstart, init_obs)
//! scale ~ 1
//! cmean ~ 1
//! lcsd ~ 1
//! ```

use crate::error::{ModelError, Result};
use crate::priors::check_known;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Right-hand side used when a sub-parameter has no override
pub const INTERCEPT_ONLY: &str = "1";

/// Linear predictor for one sub-parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFormula {
    /// Sub-parameter name
    pub parameter: String,
    /// Right-hand side, without the leading `~`
    pub rhs: String,
}

/// Outcome, non-linear transform and per-parameter predictors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Outcome column
    pub outcome: String,
    /// Name of the function applied on the right-hand side
    pub transform: String,
    /// Transform arguments: data columns and sub-parameters, in call order
    pub arguments: Vec<String>,
    /// One predictor per sub-parameter
    pub parameters: Vec<SubFormula>,
    /// Whether the transform is non-linear in its parameters
    pub nonlinear: bool,
}

impl Formula {
    /// Predictor for `parameter`, if declared.
    pub fn parameter(&self, parameter: &str) -> Option<&SubFormula> {
        self.parameters.iter().find(|p| p.parameter == parameter)
    }

    /// Data columns the formula reads, i.e. arguments that are not sub-parameters.
    pub fn data_columns(&self) -> Vec<&str> {
        std::iter::once(self.outcome.as_str())
            .chain(
                self.arguments
                    .iter()
                    .map(String::as_str)
                    .filter(|a| self.parameter(a).is_none()),
            )
            .collect()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}({})",
            self.outcome,
            self.transform,
            self.arguments.join(", ")
        )?;
        for p in &self.parameters {
            write!(f, "\n{} ~ {}", p.parameter, p.rhs)?;
        }
        Ok(())
    }
}

/// Per sub-parameter right-hand side overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormulaOverrides(BTreeMap<String, String>);

impl FormulaOverrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the predictor for `name`. A leading `~` is optional.
    pub fn set(mut self, name: impl Into<String>, rhs: impl Into<String>) -> Self {
        self.0.insert(name.into(), rhs.into());
        self
    }

    /// Raw override for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Overridden sub-parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Build the per-parameter predictors for `declared` sub-parameters.
///
/// Parameters without an override are intercept-only.
pub fn sub_formulas(
    family: &str,
    declared: &[&str],
    overrides: &FormulaOverrides,
) -> Result<Vec<SubFormula>> {
    check_known(family, declared, overrides.names())?;

    declared
        .iter()
        .map(|&parameter| {
            let rhs = match overrides.get(parameter) {
                Some(raw) => normalize_rhs(family, parameter, raw)?,
                None => INTERCEPT_ONLY.to_string(),
            };
            Ok(SubFormula {
                parameter: parameter.to_string(),
                rhs,
            })
        })
        .collect()
}

fn normalize_rhs(family: &str, parameter: &str, raw: &str) -> Result<String> {
    let invalid = |reason: &str| ModelError::InvalidParameter {
        family: family.to_string(),
        name: parameter.to_string(),
        reason: reason.to_string(),
    };

    let rhs = raw.trim();
    let rhs = rhs.strip_prefix('~').unwrap_or(rhs).trim();
    if rhs.is_empty() {
        return Err(invalid("formula right-hand side is empty"));
    }
    if rhs.contains('~') {
        return Err(invalid("formula must be one-sided, e.g. '~ 1 + location'"));
    }
    Ok(rhs.split_whitespace().collect::<Vec<_>>().join(" "))
}
