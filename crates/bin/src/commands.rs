//! Subcommand arguments and handlers.

use clap::Args;
use epiconv::data::io::{read_observations_csv, write_prepared, write_prepared_csv};
use epiconv::data::config::{DEFAULT_INITIAL_OBS, DEFAULT_MAX_CONVOLUTION};
use epiconv::fit::EngineError;
use epiconv::{
    CONVOLUTION, ColumnRoles, FitOptions, FitOutcome, FitRequest, FormulaOverrides,
    InferenceEngine, ModelRegistry, ModelSpecification, Normal, ObservationFamily, PrepareConfig,
    PreparedData, PriorOverrides, idbrm,
};
use std::convert::Infallible;
use std::error::Error;
use std::path::PathBuf;

/// Observation file and preparation settings
#[derive(Args, Debug)]
pub(crate) struct DataArgs {
    /// Observation CSV with a header row
    input: PathBuf,

    /// Model family the data is prepared for
    #[arg(long, default_value = CONVOLUTION)]
    family: String,

    /// Column holding the location label (default: `location`, or a single "global" location)
    #[arg(long)]
    location: Option<String>,

    /// Column holding the primary counts (default: `primary`)
    #[arg(long)]
    primary: Option<String>,

    /// Column holding the secondary counts (default: `secondary`)
    #[arg(long)]
    secondary: Option<String>,

    /// Leading observations per location excluded from the likelihood
    #[arg(long, default_value_t = DEFAULT_INITIAL_OBS)]
    initial_obs: i64,

    /// Maximum convolution window length
    #[arg(long, default_value_t = DEFAULT_MAX_CONVOLUTION)]
    max_convolution: i64,
}

impl DataArgs {
    fn roles(&self) -> ColumnRoles {
        let mut roles = ColumnRoles::default();
        if let Some(column) = &self.location {
            roles = roles.location(column);
        }
        if let Some(column) = &self.primary {
            roles = roles.primary(column);
        }
        if let Some(column) = &self.secondary {
            roles = roles.secondary(column);
        }
        roles
    }

    fn load(&self, registry: &ModelRegistry) -> Result<PreparedData, Box<dyn Error>> {
        let config = PrepareConfig::new(self.initial_obs, self.max_convolution)?;
        let frame = read_observations_csv(&self.input)?;
        tracing::info!(input = %self.input.display(), rows = frame.height(), "read observations");
        Ok(registry.prepare(&self.family, frame, &self.roles(), &config)?)
    }
}

/// Prior and formula overrides
#[derive(Args, Debug, Default)]
pub(crate) struct OverrideArgs {
    /// Prior override as `NAME=MEAN,SD`, e.g. `cmean=2,0.5`
    #[arg(long = "prior", value_name = "NAME=MEAN,SD", value_parser = parse_prior)]
    priors: Vec<(String, Normal)>,

    /// Formula override as `NAME=RHS`, e.g. `scale=~ 1 + location`
    #[arg(long = "formula", value_name = "NAME=RHS", value_parser = parse_formula)]
    formulas: Vec<(String, String)>,
}

impl OverrideArgs {
    fn priors(&self) -> PriorOverrides {
        self.priors
            .iter()
            .fold(PriorOverrides::new(), |acc, (name, normal)| acc.set(name, *normal))
    }

    fn formula(&self) -> FormulaOverrides {
        self.formulas
            .iter()
            .fold(FormulaOverrides::new(), |acc, (name, rhs)| acc.set(name, rhs))
    }
}

fn parse_prior(raw: &str) -> Result<(String, Normal), String> {
    let (name, params) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MEAN,SD, got '{raw}'"))?;
    let (mean, sd) = params
        .split_once(',')
        .ok_or_else(|| format!("expected MEAN,SD after '{name}=', got '{params}'"))?;
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {e}", s.trim()))
    };
    Ok((name.trim().to_string(), Normal::new(number(mean)?, number(sd)?)))
}

fn parse_formula(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, rhs)| (name.trim().to_string(), rhs.to_string()))
        .ok_or_else(|| format!("expected NAME=RHS, got '{raw}'"))
}

/// Engine stand-in; the command line only produces dry runs.
#[derive(Debug)]
struct NoEngine;

impl InferenceEngine for NoEngine {
    type Fit = Infallible;

    fn fit(&self, _request: &FitRequest) -> Result<Infallible, EngineError> {
        Err("no inference engine is available from the command line".into())
    }
}

/// Write prepared observations as CSV to `output` or stdout.
pub(crate) fn prepare(data: &DataArgs, output: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let registry = ModelRegistry::with_builtin();
    let prepared = data.load(&registry)?;
    let records = prepared.records()?;

    match output {
        Some(path) => {
            write_prepared_csv(&records, path)?;
            tracing::info!(output = %path.display(), rows = records.len(), "wrote prepared data");
        }
        None => write_prepared(&records, std::io::stdout().lock())?,
    }
    Ok(())
}

/// Print the priors of a model family as JSON.
pub(crate) fn priors(family: &str, overrides: &OverrideArgs) -> Result<(), Box<dyn Error>> {
    let registry = ModelRegistry::with_builtin();
    let priors = registry.id_priors(family, &overrides.priors())?;
    println!("{}", serde_json::to_string_pretty(&priors)?);
    Ok(())
}

/// Print the formula of a model family.
pub(crate) fn formula(
    family: &str,
    overrides: &OverrideArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let registry = ModelRegistry::with_builtin();
    let formula = registry.id_formula(family, &overrides.formula())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&formula)?);
    } else {
        println!("{formula}");
    }
    Ok(())
}

/// Dry-run a fit and print the assembled program, or the specification as JSON.
pub(crate) fn code(
    data: &DataArgs,
    observation: ObservationFamily,
    overrides: &OverrideArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let registry = ModelRegistry::with_builtin();
    let prepared = data.load(&registry)?;
    let options = FitOptions::new()
        .family(observation)
        .priors(overrides.priors())
        .formula(overrides.formula())
        .dry_run(true);

    if json {
        let spec = registry.specification(&prepared, &options.priors, &options.formula)?;
        println!("{}", specification_json(&spec, options.family)?);
        return Ok(());
    }

    match idbrm(&NoEngine, &registry, prepared, &options)? {
        FitOutcome::DryRun(text) => print!("{text}"),
        FitOutcome::Fitted(never) => match never {},
    }
    Ok(())
}

/// Specification JSON with the observation family alongside the model parts.
fn specification_json(
    spec: &ModelSpecification,
    observation: ObservationFamily,
) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(spec)?;
    if let serde_json::Value::Object(fields) = &mut value {
        fields.insert("observation".to_string(), serde_json::to_value(observation)?);
    }
    serde_json::to_string_pretty(&value)
}

/// List registered model families and observation families.
pub(crate) fn families() -> Result<(), Box<dyn Error>> {
    let registry = ModelRegistry::with_builtin();
    println!("Model families:");
    for tag in registry.tags() {
        let family = registry.family(tag)?;
        println!("  {tag} ({})", family.sub_parameters().join(", "));
    }
    println!("Observation families:");
    for family in ObservationFamily::ALL {
        let marker = if family == ObservationFamily::default() {
            " [default]"
        } else {
            ""
        };
        println!("  {family}{marker}");
    }
    Ok(())
}
