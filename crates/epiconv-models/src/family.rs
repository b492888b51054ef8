//! Model family capability set

use crate::error::Result;
use crate::formula::{Formula, FormulaOverrides};
use crate::priors::{Prior, PriorOverrides};
use crate::stancode::StanCode;
use epiconv_data::{ColumnRoles, PrepareConfig, PreparedData};
use polars::prelude::DataFrame;
use std::fmt::Debug;

/// The four capabilities every model family provides.
///
/// Families are looked up by [`ModelFamily::tag`]; all capabilities are pure
/// and produce fresh output per call.
pub trait ModelFamily: Debug + Send + Sync {
    /// Unique family tag used for dispatch
    fn tag(&self) -> &'static str;

    /// Non-linear sub-parameters, in formula argument order
    fn sub_parameters(&self) -> &'static [&'static str];

    /// Prepare raw observations and tag them with this family.
    fn prepare(
        &self,
        frame: DataFrame,
        roles: &ColumnRoles,
        config: &PrepareConfig,
    ) -> Result<PreparedData>;

    /// Priors for every sub-parameter, defaults replaced by `overrides`.
    fn priors(&self, overrides: &PriorOverrides) -> Result<Vec<Prior>>;

    /// Composite formula, intercept-only unless overridden.
    fn formula(&self, overrides: &FormulaOverrides) -> Result<Formula>;

    /// Stan function fragments in dependency order.
    fn stancode(&self) -> StanCode;
}
