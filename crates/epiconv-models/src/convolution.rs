//! Delay convolution family
//!
//! Models secondary observations as a scaled convolution of primary
//! observations with a discretised lognormal delay:
//!
//! - `scale`: logit of the fraction of primary observations that become secondary
//! - `cmean`: log mean of the delay
//! - `lcsd`: log of the delay's log standard deviation

use crate::error::Result;
use crate::family::ModelFamily;
use crate::formula::{Formula, FormulaOverrides, sub_formulas};
use crate::priors::{Normal, Prior, PriorOverrides, check_known};
use crate::stancode::{StanCode, StanFragment};
use epiconv_data::{ColumnRoles, PRIMARY, PrepareConfig, PreparedData, SECONDARY};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Family tag
pub const CONVOLUTION: &str = "convolution";

/// Name of the Stan function implementing the transform
pub const CONVOLVE_FUNCTION: &str = "epiconv_convolve";

const SUB_PARAMETERS: &[&str] = &["scale", "cmean", "lcsd"];

const WINDOW_COLUMNS: [&str; 4] = ["cmax", "index", "cstart", "init_obs"];

const FRAGMENTS: [(&str, &str); 4] = [
    (
        "discretised_lognormal_pmf",
        include_str!("../stan/functions/discretised_lognormal_pmf.stan"),
    ),
    ("calc_pmf", include_str!("../stan/functions/calc_pmf.stan")),
    (
        "calc_unique_pmfs",
        include_str!("../stan/functions/calc_unique_pmfs.stan"),
    ),
    (
        CONVOLVE_FUNCTION,
        include_str!("../stan/functions/epiconv_convolve.stan"),
    ),
];

/// Default hyperparameters for the convolution sub-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvolutionPriors {
    /// Prior on `scale` (default: normal(logit(0.1), 0.5))
    pub scale: Normal,
    /// Prior on `cmean` (default: normal(2.5, 1))
    pub cmean: Normal,
    /// Prior on `lcsd` (default: normal(-0.5, 0.5))
    pub lcsd: Normal,
}

impl Default for ConvolutionPriors {
    fn default() -> Self {
        Self {
            scale: Normal::new(logit(0.1), 0.5),
            cmean: Normal::new(2.5, 1.0),
            lcsd: Normal::new(-0.5, 0.5),
        }
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// The `convolution` model family
#[derive(Debug, Clone, Default)]
pub struct ConvolutionFamily {
    defaults: ConvolutionPriors,
}

impl ConvolutionFamily {
    /// Family with custom default priors.
    pub const fn with_defaults(defaults: ConvolutionPriors) -> Self {
        Self { defaults }
    }

    /// Default priors in use
    pub const fn defaults(&self) -> &ConvolutionPriors {
        &self.defaults
    }
}

impl ModelFamily for ConvolutionFamily {
    fn tag(&self) -> &'static str {
        CONVOLUTION
    }

    fn sub_parameters(&self) -> &'static [&'static str] {
        SUB_PARAMETERS
    }

    fn prepare(
        &self,
        frame: DataFrame,
        roles: &ColumnRoles,
        config: &PrepareConfig,
    ) -> Result<PreparedData> {
        let prepared = epiconv_data::prepare_observations(frame, roles, config)?;
        Ok(PreparedData::new(prepared, CONVOLUTION, *config))
    }

    fn priors(&self, overrides: &PriorOverrides) -> Result<Vec<Prior>> {
        check_known(CONVOLUTION, SUB_PARAMETERS, overrides.names())?;

        let defaults = [
            ("scale", self.defaults.scale),
            ("cmean", self.defaults.cmean),
            ("lcsd", self.defaults.lcsd),
        ];
        defaults
            .into_iter()
            .map(|(name, default)| {
                let normal = overrides.get(name).copied().unwrap_or(default);
                normal.validate(CONVOLUTION, name)?;
                Ok(Prior::normal(name, normal))
            })
            .collect()
    }

    fn formula(&self, overrides: &FormulaOverrides) -> Result<Formula> {
        let parameters = sub_formulas(CONVOLUTION, SUB_PARAMETERS, overrides)?;

        let arguments = std::iter::once(PRIMARY)
            .chain(SUB_PARAMETERS.iter().copied())
            .chain(WINDOW_COLUMNS)
            .map(str::to_string)
            .collect();

        Ok(Formula {
            outcome: SECONDARY.to_string(),
            transform: CONVOLVE_FUNCTION.to_string(),
            arguments,
            parameters,
            nonlinear: true,
        })
    }

    fn stancode(&self) -> StanCode {
        StanCode::new(
            FRAGMENTS
                .iter()
                .map(|(name, code)| StanFragment::function(*name, *code))
                .collect(),
        )
    }
}
