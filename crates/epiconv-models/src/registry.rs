//! Model Registry
//!
//! Maps family tags to [`ModelFamily`] implementations and dispatches the
//! `prepare` / `id_priors` / `id_formula` / `id_stancode` capabilities by tag.
//! New families are registered at runtime; the dispatcher itself never
//! changes.

use crate::convolution::ConvolutionFamily;
use crate::error::{ModelError, Result};
use crate::family::ModelFamily;
use crate::formula::{Formula, FormulaOverrides};
use crate::priors::{Prior, PriorOverrides};
use crate::specification::ModelSpecification;
use crate::stancode::StanCode;
use epiconv_data::{ColumnRoles, PrepareConfig, PreparedData};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of model families keyed by tag
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    families: BTreeMap<&'static str, Arc<dyn ModelFamily>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `convolution` family.
    pub fn with_builtin() -> Self {
        let family = ConvolutionFamily::default();
        debug_assert!(validate_tag(family.tag()).is_ok());
        debug_assert!(validate_capabilities(&family).is_ok());

        let mut families: BTreeMap<&'static str, Arc<dyn ModelFamily>> = BTreeMap::new();
        families.insert(family.tag(), Arc::new(family));
        Self { families }
    }

    /// Register a family after checking its tag and capabilities.
    ///
    /// The tag must be a lowercase identifier not already in use. The default
    /// formula's transform must be defined by one of the family's Stan
    /// fragments, and the fragments must be in dependency order.
    pub fn register<F>(&mut self, family: F) -> Result<()>
    where
        F: ModelFamily + 'static,
    {
        let tag = family.tag();
        validate_tag(tag)?;
        if self.families.contains_key(tag) {
            return Err(ModelError::DuplicateFamily {
                tag: tag.to_string(),
            });
        }
        validate_capabilities(&family)?;

        tracing::debug!(family = tag, "registered model family");
        self.families.insert(tag, Arc::new(family));
        Ok(())
    }

    /// Look up the family registered under `tag`.
    pub fn family(&self, tag: &str) -> Result<&dyn ModelFamily> {
        self.families
            .get(tag)
            .map(|f| f.as_ref())
            .ok_or_else(|| ModelError::UnknownModelFamily {
                requested: tag.to_string(),
                known: self.tags().into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.families.keys().copied().collect()
    }

    /// Whether `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.families.contains_key(tag)
    }

    /// Prepare observations with the family registered under `tag`.
    pub fn prepare(
        &self,
        tag: &str,
        frame: DataFrame,
        roles: &ColumnRoles,
        config: &PrepareConfig,
    ) -> Result<PreparedData> {
        self.family(tag)?.prepare(frame, roles, config)
    }

    /// Priors for `tag`.
    pub fn id_priors(&self, tag: &str, overrides: &PriorOverrides) -> Result<Vec<Prior>> {
        self.family(tag)?.priors(overrides)
    }

    /// Formula for `tag`.
    pub fn id_formula(&self, tag: &str, overrides: &FormulaOverrides) -> Result<Formula> {
        self.family(tag)?.formula(overrides)
    }

    /// Stan fragments for `tag`.
    pub fn id_stancode(&self, tag: &str) -> Result<StanCode> {
        Ok(self.family(tag)?.stancode())
    }

    /// Assemble priors, formula and Stan code for a prepared dataset's family.
    pub fn specification(
        &self,
        data: &PreparedData,
        priors: &PriorOverrides,
        formula: &FormulaOverrides,
    ) -> Result<ModelSpecification> {
        let family = self.family(data.family())?;
        Ok(ModelSpecification {
            family: family.tag().to_string(),
            priors: family.priors(priors)?,
            formula: family.formula(formula)?,
            stancode: family.stancode(),
        })
    }
}

fn validate_tag(tag: &str) -> Result<()> {
    let invalid = |reason: &str| ModelError::InvalidFamilyTag {
        tag: tag.to_string(),
        reason: reason.to_string(),
    };

    let Some(first) = tag.chars().next() else {
        return Err(invalid("tag is empty"));
    };
    if !first.is_ascii_lowercase() {
        return Err(invalid("tag must start with a lowercase letter"));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(invalid("tag may only contain a-z, 0-9 and '_'"));
    }
    Ok(())
}

fn validate_capabilities(family: &dyn ModelFamily) -> Result<()> {
    let tag = family.tag();
    let incomplete = |reason: String| ModelError::IncompleteFamily {
        tag: tag.to_string(),
        reason,
    };

    if family.sub_parameters().is_empty() {
        return Err(incomplete("declares no sub-parameters".to_string()));
    }

    family.priors(&PriorOverrides::new())?;

    let formula = family.formula(&FormulaOverrides::new())?;
    let stancode = family.stancode();
    if stancode.fragments.is_empty() {
        return Err(incomplete("provides no Stan fragments".to_string()));
    }
    if stancode.fragment(&formula.transform).is_none() {
        return Err(incomplete(format!(
            "formula transform '{}' has no Stan fragment",
            formula.transform
        )));
    }
    if let Some((fragment, callee)) = stancode.ordering_violation() {
        return Err(incomplete(format!(
            "fragment '{fragment}' calls '{callee}' before it is defined"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convolution::CONVOLUTION;
    use crate::priors::Normal;
    use crate::stancode::StanFragment;

    /// Minimal family used to exercise registration checks
    #[derive(Debug)]
    struct StubFamily {
        tag: &'static str,
        transform: &'static str,
    }

    impl ModelFamily for StubFamily {
        fn tag(&self) -> &'static str {
            self.tag
        }

        fn sub_parameters(&self) -> &'static [&'static str] {
            &["rate"]
        }

        fn prepare(
            &self,
            frame: DataFrame,
            roles: &ColumnRoles,
            config: &PrepareConfig,
        ) -> Result<PreparedData> {
            let prepared = epiconv_data::prepare_observations(frame, roles, config)?;
            Ok(PreparedData::new(prepared, self.tag, *config))
        }

        fn priors(&self, _overrides: &PriorOverrides) -> Result<Vec<Prior>> {
            Ok(vec![Prior::normal("rate", Normal::new(0.0, 1.0))])
        }

        fn formula(&self, overrides: &FormulaOverrides) -> Result<Formula> {
            Ok(Formula {
                outcome: "secondary".to_string(),
                transform: self.transform.to_string(),
                arguments: vec!["primary".to_string(), "rate".to_string()],
                parameters: crate::formula::sub_formulas(self.tag, &["rate"], overrides)?,
                nonlinear: true,
            })
        }

        fn stancode(&self) -> StanCode {
            StanCode::new(vec![StanFragment::function(
                "rate_model",
                "vector rate_model(vector primary, vector rate) {\n  return primary .* exp(rate);\n}",
            )])
        }
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ModelRegistry::with_builtin();
        assert_eq!(registry.tags(), vec![CONVOLUTION]);
        assert!(registry.contains(CONVOLUTION));
    }

    #[test]
    fn test_builtin_passes_registration_checks() {
        let family = ConvolutionFamily::default();
        assert!(validate_tag(family.tag()).is_ok());
        validate_capabilities(&family).unwrap();

        let mut registry = ModelRegistry::new();
        registry.register(family).unwrap();
        assert_eq!(registry.tags(), ModelRegistry::with_builtin().tags());
    }

    #[test]
    fn test_unknown_family() {
        let registry = ModelRegistry::with_builtin();
        match registry.id_priors("nonexistent", &PriorOverrides::new()) {
            Err(ModelError::UnknownModelFamily { requested, known }) => {
                assert_eq!(requested, "nonexistent");
                assert_eq!(known, vec!["convolution".to_string()]);
            }
            other => panic!("expected UnknownModelFamily, got {other:?}"),
        }
        assert!(registry.id_formula("nonexistent", &FormulaOverrides::new()).is_err());
        assert!(registry.id_stancode("nonexistent").is_err());
    }

    #[test]
    fn test_register_additional_family() {
        let mut registry = ModelRegistry::with_builtin();
        registry
            .register(StubFamily {
                tag: "rate",
                transform: "rate_model",
            })
            .unwrap();
        assert_eq!(registry.tags(), vec!["convolution", "rate"]);

        let formula = registry.id_formula("rate", &FormulaOverrides::new()).unwrap();
        assert_eq!(formula.transform, "rate_model");
        let code = registry.id_stancode(CONVOLUTION).unwrap();
        assert_eq!(code.fragments.len(), 4);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ModelRegistry::with_builtin();
        assert!(matches!(
            registry.register(ConvolutionFamily::default()),
            Err(ModelError::DuplicateFamily { .. })
        ));
    }

    #[test]
    fn test_invalid_tags_rejected() {
        for tag in ["", "Rate", "9lives", "rate-model"] {
            let mut registry = ModelRegistry::new();
            let result = registry.register(StubFamily {
                tag,
                transform: "rate_model",
            });
            assert!(
                matches!(result, Err(ModelError::InvalidFamilyTag { .. })),
                "tag {tag:?} accepted"
            );
        }
    }

    #[test]
    fn test_missing_transform_fragment_rejected() {
        let mut registry = ModelRegistry::new();
        let result = registry.register(StubFamily {
            tag: "rate",
            transform: "undefined_fn",
        });
        assert!(matches!(result, Err(ModelError::IncompleteFamily { .. })));
        assert!(registry.tags().is_empty());
    }
}
