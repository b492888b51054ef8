//! Fit requests and dry-run program assembly

use crate::error::{FitError, Result};
use crate::family::ObservationFamily;
use epiconv_data::PreparedData;
use epiconv_models::{Formula, FormulaOverrides, ModelRegistry, Prior, PriorOverrides, StanCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Everything the inference engine needs for one fit
#[derive(Debug, Clone)]
pub struct FitRequest {
    data: PreparedData,
    formula: Formula,
    family: ObservationFamily,
    priors: Vec<Prior>,
    stancode: StanCode,
}

impl FitRequest {
    /// Start building a request.
    pub fn builder() -> FitRequestBuilder {
        FitRequestBuilder::new()
    }

    /// Prepared observations
    pub const fn data(&self) -> &PreparedData {
        &self.data
    }

    /// Composite formula
    pub const fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Observation model
    pub const fn family(&self) -> ObservationFamily {
        self.family
    }

    /// Priors in sub-parameter order
    pub fn priors(&self) -> &[Prior] {
        &self.priors
    }

    /// Stan fragments in dependency order
    pub const fn stancode(&self) -> &StanCode {
        &self.stancode
    }

    /// Model inputs without the data, as reported on engine failure.
    pub fn context(&self) -> FitContext {
        FitContext {
            formula: self.formula.clone(),
            family: self.family,
            priors: self.priors.clone(),
            stancode: self.stancode.clone(),
        }
    }

    /// Assemble the program text returned by a dry run.
    ///
    /// The version marker and `functions` block come first, followed by a
    /// commented header with the observation family, formula and priors.
    pub fn program_text(&self) -> String {
        let mut out = self.stancode.functions_block();
        let _ = writeln!(out, "// family: {}", self.family);
        out.push_str("// formula:\n");
        for line in self.formula.to_string().lines() {
            let _ = writeln!(out, "//   {line}");
        }
        out.push_str("// priors:\n");
        for prior in &self.priors {
            let _ = writeln!(out, "//   {prior}");
        }
        out
    }
}

/// Model inputs handed to the engine, kept for diagnosing failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitContext {
    /// Formula passed to the engine
    pub formula: Formula,
    /// Observation model passed to the engine
    pub family: ObservationFamily,
    /// Priors passed to the engine
    pub priors: Vec<Prior>,
    /// Stan fragments passed to the engine
    pub stancode: StanCode,
}

impl fmt::Display for FitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}({}) with {} and {} priors",
            self.formula.outcome,
            self.formula.transform,
            self.formula.arguments.join(", "),
            self.family,
            self.priors.len()
        )
    }
}

/// Builder for [`FitRequest`]
///
/// Every component is mandatory. The formula, priors and Stan fragments may be
/// filled from a registry with [`FitRequestBuilder::defaults`]; explicitly set
/// components are kept.
#[derive(Debug, Default)]
pub struct FitRequestBuilder {
    data: Option<PreparedData>,
    formula: Option<Formula>,
    family: Option<ObservationFamily>,
    priors: Option<Vec<Prior>>,
    stancode: Option<StanCode>,
}

impl FitRequestBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prepared data.
    pub fn data(mut self, data: PreparedData) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the formula.
    pub fn formula(mut self, formula: Formula) -> Self {
        self.formula = Some(formula);
        self
    }

    /// Set the observation family.
    pub const fn family(mut self, family: ObservationFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Set the priors.
    pub fn priors(mut self, priors: Vec<Prior>) -> Self {
        self.priors = Some(priors);
        self
    }

    /// Set the Stan fragments.
    pub fn stancode(mut self, stancode: StanCode) -> Self {
        self.stancode = Some(stancode);
        self
    }

    /// Fill unset components from the family registered for the data's tag.
    pub fn defaults(self, registry: &ModelRegistry) -> Result<Self> {
        self.defaults_with(registry, &PriorOverrides::new(), &FormulaOverrides::new())
    }

    /// Like [`Self::defaults`], applying hyperparameter and formula overrides.
    pub fn defaults_with(
        mut self,
        registry: &ModelRegistry,
        priors: &PriorOverrides,
        formula: &FormulaOverrides,
    ) -> Result<Self> {
        let Some(data) = &self.data else {
            return Err(FitError::MissingModelSpecification { component: "data" });
        };
        let tag = data.family().to_string();

        if self.formula.is_none() {
            self.formula = Some(registry.id_formula(&tag, formula)?);
        }
        if self.priors.is_none() {
            self.priors = Some(registry.id_priors(&tag, priors)?);
        }
        if self.stancode.is_none() {
            self.stancode = Some(registry.id_stancode(&tag)?);
        }
        self.family.get_or_insert_with(ObservationFamily::default);

        tracing::debug!(family = %tag, "filled fit request from registry defaults");
        Ok(self)
    }

    /// Check that every component is present and consistent.
    pub fn build(self) -> Result<FitRequest> {
        let missing = |component| FitError::MissingModelSpecification { component };

        let data = self.data.ok_or_else(|| missing("data"))?;
        let formula = self.formula.ok_or_else(|| missing("formula"))?;
        let family = self.family.ok_or_else(|| missing("family"))?;
        let priors = self
            .priors
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("priors"))?;
        let stancode = self
            .stancode
            .filter(|c| !c.fragments.is_empty())
            .ok_or_else(|| missing("stancode"))?;

        if stancode.fragment(&formula.transform).is_none() {
            return Err(FitError::UndefinedTransform {
                transform: formula.transform.clone(),
            });
        }
        if let Some(column) = formula
            .data_columns()
            .into_iter()
            .find(|c| data.frame().get_column_index(c).is_none())
        {
            return Err(FitError::MissingDataColumn {
                column: column.to_string(),
            });
        }

        Ok(FitRequest {
            data,
            formula,
            family,
            priors,
            stancode,
        })
    }
}
