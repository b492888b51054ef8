#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/epiforecasts/epiconv/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod config;
pub mod enforce;
pub mod error;
pub mod io;
pub mod prepare;
pub mod window;

pub use columns::{DATE, GLOBAL_LOCATION, LOCATION, PRIMARY, SECONDARY, resolve_columns};
pub use config::{ColumnRoles, PrepareConfig};
pub use error::{DataError, Result};
pub use prepare::{PREPARED_COLUMNS, PreparedData, PreparedRecord, prepare_observations};
pub use window::{ConvolutionWindow, WindowParams};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
