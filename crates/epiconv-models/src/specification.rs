//! Model specification bundle

use crate::error::Result;
use crate::formula::Formula;
use crate::priors::Prior;
use crate::stancode::StanCode;
use serde::{Deserialize, Serialize};

/// Priors, formula and Stan code assembled for one request
///
/// Built fresh per request and never shared, since each request may carry
/// different hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpecification {
    /// Family tag the parts were produced by
    pub family: String,
    /// Priors in sub-parameter order
    pub priors: Vec<Prior>,
    /// Composite formula
    pub formula: Formula,
    /// Stan function fragments
    pub stancode: StanCode,
}

impl ModelSpecification {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a specification previously written with [`Self::to_json`].
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::FormulaOverrides;
    use crate::priors::PriorOverrides;
    use crate::registry::ModelRegistry;
    use epiconv_data::{PrepareConfig, PreparedData};
    use polars::prelude::DataFrame;

    #[test]
    fn test_json_round_trip() {
        let registry = ModelRegistry::with_builtin();
        let data = PreparedData::new(DataFrame::empty(), "convolution", PrepareConfig::default());
        let spec = registry
            .specification(&data, &PriorOverrides::new(), &FormulaOverrides::new())
            .unwrap();

        let json = spec.to_json().unwrap();
        assert!(json.contains("\"family\": \"convolution\""));
        assert!(json.contains("epiconv_convolve"));
        assert_eq!(ModelSpecification::from_json(&json).unwrap(), spec);
    }
}
