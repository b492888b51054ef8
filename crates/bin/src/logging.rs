//! Logging setup for the command line.

use std::error::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct Verbosity {
    #[arg(
        long,
        short = 'v',
        help = "Use verbose output (or `-vv` for debug output)",
        action = clap::ArgAction::Count,
        global = true,
        overrides_with = "quiet",
    )]
    verbose: u8,

    #[arg(
        long,
        short,
        help = "Use quiet output (or `-qq` for silent output)",
        action = clap::ArgAction::Count,
        global = true,
        overrides_with = "verbose",
    )]
    quiet: u8,
}

impl Verbosity {
    /// Level implied by the `-v` / `-q` counts.
    pub(crate) const fn level_filter(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (1, _) => LevelFilter::ERROR,
            (2.., _) => LevelFilter::OFF,
            (_, 0) => LevelFilter::WARN,
            (_, 1) => LevelFilter::INFO,
            (_, 2) => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over the flags.
pub(crate) fn setup_tracing(verbosity: &Verbosity) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.level_filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| err as Box<dyn Error>)
}
