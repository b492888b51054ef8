//! One-call fitting from raw observations.

use epiconv::fit::EngineError;
use epiconv::{
    ColumnRoles, FitError, FitOptions, FitOutcome, FitRequest, FormulaOverrides,
    InferenceEngine, ModelRegistry, Normal, ObservationFamily, PrepareConfig, PriorOverrides,
    idbrm, prepare,
};
use polars::prelude::*;
use rstest::rstest;
use std::cell::Cell;

/// Engine returning a summary of what it was asked to fit
#[derive(Debug, Default)]
struct SummaryEngine {
    calls: Cell<usize>,
}

impl InferenceEngine for SummaryEngine {
    type Fit = (ObservationFamily, usize, String);

    fn fit(&self, request: &FitRequest) -> Result<Self::Fit, EngineError> {
        self.calls.set(self.calls.get() + 1);
        let scale = request
            .formula()
            .parameter("scale")
            .map(|p| p.rhs.clone())
            .unwrap_or_default();
        Ok((request.family(), request.data().height(), scale))
    }
}

fn outbreak() -> DataFrame {
    let dates: Vec<String> = (1..=20).map(|d| format!("2020-04-{d:02}")).collect();
    let cases: Vec<i64> = (1..=20).map(|i| i * 4).collect();
    let deaths: Vec<i64> = (0..20).map(|i| if i < 3 { 0 } else { i / 2 }).collect();
    df!(
        "date" => dates,
        "cases" => cases,
        "deaths" => deaths,
    )
    .unwrap()
}

fn roles() -> ColumnRoles {
    ColumnRoles::default().primary("cases").secondary("deaths")
}

#[rstest]
#[case(ObservationFamily::Poisson)]
#[case(ObservationFamily::NegativeBinomial)]
fn test_idbrm_fits_with_overrides(#[case] family: ObservationFamily) {
    let registry = ModelRegistry::with_builtin();
    let data = prepare(&registry, outbreak(), &roles(), &PrepareConfig::default()).unwrap();
    let engine = SummaryEngine::default();
    let options = FitOptions::new()
        .family(family)
        .formula(FormulaOverrides::new().set("scale", "~ 1 + time"));

    let outcome = idbrm(&engine, &registry, data, &options).unwrap();

    assert_eq!(engine.calls.get(), 1);
    assert_eq!(
        outcome.into_fitted(),
        Some((family, 20, "1 + time".to_string()))
    );
}

#[test]
fn test_idbrm_dry_run() {
    let registry = ModelRegistry::with_builtin();
    let data = prepare(&registry, outbreak(), &roles(), &PrepareConfig::default()).unwrap();
    let engine = SummaryEngine::default();
    let options = FitOptions::new()
        .priors(PriorOverrides::new().set("lcsd", Normal::new(0.0, 0.25)))
        .dry_run(true);

    let outcome = idbrm(&engine, &registry, data, &options).unwrap();

    assert_eq!(engine.calls.get(), 0);
    let FitOutcome::DryRun(text) = outcome else {
        panic!("expected a dry run");
    };
    assert!(text.contains("//   lcsd ~ normal(0, 0.25) (class = b)"));
    assert!(text.contains("// family: negbinomial(link = \"identity\")"));
}

#[test]
fn test_idbrm_rejects_unknown_override() {
    let registry = ModelRegistry::with_builtin();
    let data = prepare(&registry, outbreak(), &roles(), &PrepareConfig::default()).unwrap();
    let options = FitOptions::new().formula(FormulaOverrides::new().set("delay", "~ 1"));

    let err = idbrm(&SummaryEngine::default(), &registry, data, &options).unwrap_err();
    assert!(matches!(err, FitError::Model(_)));
    assert!(err.to_string().contains("delay"));
}
