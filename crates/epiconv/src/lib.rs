#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/epiforecasts/epiconv/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use epiconv_data as data;
pub use epiconv_fit as fit;
pub use epiconv_models as models;

pub use epiconv_data::{ColumnRoles, PrepareConfig, PreparedData, PreparedRecord};
pub use epiconv_fit::{
    FitError, FitOptions, FitOutcome, FitRequest, InferenceEngine, ObservationFamily,
};
pub use epiconv_models::{
    CONVOLUTION, FormulaOverrides, ModelRegistry, ModelSpecification, Normal, PriorOverrides,
};

use polars::prelude::DataFrame;

/// Prepare raw observations for the built-in `convolution` family.
pub fn prepare(
    registry: &ModelRegistry,
    frame: DataFrame,
    roles: &ColumnRoles,
    config: &PrepareConfig,
) -> epiconv_fit::Result<PreparedData> {
    Ok(registry.prepare(CONVOLUTION, frame, roles, config)?)
}

/// Fit a delay convolution model to prepared data in one call.
///
/// Formula, priors and Stan fragments come from the family registered under
/// the data's tag, with `options` overrides applied. With `options.dry` set,
/// the assembled program text is returned and `engine` is never called.
pub fn idbrm<E>(
    engine: &E,
    registry: &ModelRegistry,
    data: PreparedData,
    options: &FitOptions,
) -> epiconv_fit::Result<FitOutcome<E::Fit>>
where
    E: InferenceEngine + ?Sized,
{
    tracing::debug!(family = data.family(), rows = data.height(), dry = options.dry, "idbrm");
    let request = FitRequest::builder()
        .data(data)
        .family(options.family)
        .defaults_with(registry, &options.priors, &options.formula)?
        .build()?;
    epiconv_fit::fit(engine, &request, options.dry)
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
