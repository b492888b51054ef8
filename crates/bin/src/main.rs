//! epiconv CLI binary.
//!
//! Prepares observation files and assembles delay convolution models.

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use commands::{DataArgs, OverrideArgs};
use epiconv::{CONVOLUTION, ObservationFamily};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "epiconv")]
#[command(about = "epiconv: delay convolution models for epidemiological observations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    verbosity: logging::Verbosity,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare an observation CSV for model fitting
    Prepare {
        #[command(flatten)]
        data: DataArgs,

        /// Output CSV (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the priors of a model family as JSON
    Priors {
        /// Model family tag
        #[arg(long, default_value = CONVOLUTION)]
        family: String,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Show the formula of a model family
    Formula {
        /// Model family tag
        #[arg(long, default_value = CONVOLUTION)]
        family: String,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assemble the Stan program for an observation CSV without fitting
    Code {
        #[command(flatten)]
        data: DataArgs,

        /// Observation model (poisson or negbinomial)
        #[arg(long, default_value = "negbinomial")]
        observation: ObservationFamily,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Print the model specification as JSON instead of program text
        #[arg(long)]
        json: bool,
    },

    /// List model and observation families
    Families,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::setup_tracing(&cli.verbosity)?;

    match cli.command {
        Commands::Prepare { data, output } => commands::prepare(&data, output.as_ref())?,
        Commands::Priors { family, overrides } => commands::priors(&family, &overrides)?,
        Commands::Formula {
            family,
            overrides,
            json,
        } => commands::formula(&family, &overrides, json)?,
        Commands::Code {
            data,
            observation,
            overrides,
            json,
        } => commands::code(&data, observation, &overrides, json)?,
        Commands::Families => commands::families()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_code_command() {
        let cli = Cli::try_parse_from([
            "epiconv",
            "-v",
            "code",
            "obs.csv",
            "--primary",
            "cases",
            "--observation",
            "poisson",
            "--prior",
            "cmean=2,0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Code { observation, .. } => {
                assert_eq!(observation, ObservationFamily::Poisson);
            }
            _ => panic!("expected code command"),
        }
    }
}
