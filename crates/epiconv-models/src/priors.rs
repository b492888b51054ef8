//! Prior specifications
//!
//! Priors target the population-level coefficients of a named non-linear
//! sub-parameter. Families declare defaults; callers override them per
//! sub-parameter with [`PriorOverrides`].

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normal distribution hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normal {
    /// Location
    pub mean: f64,
    /// Scale, strictly positive
    pub sd: f64,
}

impl Normal {
    /// Create a normal prior.
    pub const fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }

    /// Check that both hyperparameters are finite and `sd > 0`.
    pub fn validate(&self, family: &str, name: &str) -> Result<()> {
        if !self.mean.is_finite() || !self.sd.is_finite() || self.sd <= 0.0 {
            return Err(ModelError::InvalidParameter {
                family: family.to_string(),
                name: name.to_string(),
                reason: format!(
                    "normal({}, {}) needs a finite mean and a positive finite sd",
                    self.mean, self.sd
                ),
            });
        }
        Ok(())
    }
}

/// Prior distribution families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum PriorDistribution {
    /// Normal distribution
    Normal(Normal),
}

impl fmt::Display for PriorDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(n) => write!(f, "normal({}, {})", n.mean, n.sd),
        }
    }
}

/// A prior on one sub-parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    /// Distribution and hyperparameters
    pub distribution: PriorDistribution,
    /// Parameter class the prior applies to
    pub class: String,
    /// Non-linear sub-parameter targeted
    pub nlpar: String,
}

impl Prior {
    /// Normal prior on the coefficients of `nlpar`.
    pub fn normal(nlpar: impl Into<String>, normal: Normal) -> Self {
        Self {
            distribution: PriorDistribution::Normal(normal),
            class: "b".to_string(),
            nlpar: nlpar.into(),
        }
    }
}

impl fmt::Display for Prior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {} (class = {})",
            self.nlpar, self.distribution, self.class
        )
    }
}

/// Per sub-parameter hyperparameter overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorOverrides(BTreeMap<String, Normal>);

impl PriorOverrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the prior for `name`.
    pub fn set(mut self, name: impl Into<String>, normal: Normal) -> Self {
        self.0.insert(name.into(), normal);
        self
    }

    /// Override for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Normal> {
        self.0.get(name)
    }

    /// Overridden sub-parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Whether nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reject overrides for sub-parameters the family does not declare.
pub(crate) fn check_known<'a>(
    family: &str,
    declared: &[&str],
    names: impl Iterator<Item = &'a str>,
) -> Result<()> {
    for name in names {
        if !declared.contains(&name) {
            return Err(ModelError::InvalidParameter {
                family: family.to_string(),
                name: name.to_string(),
                reason: format!("not a sub-parameter (expected one of: {})", declared.join(", ")),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_prior_display() {
        let prior = Prior::normal("cmean", Normal::new(2.5, 1.0));
        assert_eq!(prior.to_string(), "cmean ~ normal(2.5, 1) (class = b)");
    }

    #[rstest]
    #[case(0.0, 1.0, true)]
    #[case(-2.2, 0.5, true)]
    #[case(0.0, 0.0, false)]
    #[case(0.0, -1.0, false)]
    #[case(f64::NAN, 1.0, false)]
    #[case(0.0, f64::INFINITY, false)]
    fn test_validate(#[case] mean: f64, #[case] sd: f64, #[case] valid: bool) {
        let result = Normal::new(mean, sd).validate("convolution", "scale");
        assert_eq!(result.is_ok(), valid);
    }

    #[test]
    fn test_overrides() {
        let overrides = PriorOverrides::new().set("lcsd", Normal::new(-1.0, 0.2));
        assert_eq!(overrides.get("lcsd"), Some(&Normal::new(-1.0, 0.2)));
        assert!(overrides.get("scale").is_none());
        assert_eq!(overrides.names().collect::<Vec<_>>(), vec!["lcsd"]);
    }

    #[test]
    fn test_unknown_override_rejected() {
        let err = check_known("convolution", &["scale", "cmean"], ["shape"].into_iter()).unwrap_err();
        match err {
            ModelError::InvalidParameter { name, reason, .. } => {
                assert_eq!(name, "shape");
                assert!(reason.contains("scale, cmean"));
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_prior_json_shape() {
        let prior = Prior::normal("scale", Normal::new(-2.0, 0.5));
        let json = serde_json::to_value(&prior).unwrap();
        assert_eq!(json["distribution"]["family"], "normal");
        assert_eq!(json["distribution"]["sd"], 0.5);
        assert_eq!(json["nlpar"], "scale");
    }
}
