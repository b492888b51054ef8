#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/epiforecasts/epiconv/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod family;
pub mod options;
pub mod orchestrate;
pub mod request;

pub use engine::{EngineError, InferenceEngine};
pub use error::{FitError, Result};
pub use family::{Link, ObservationFamily};
pub use options::FitOptions;
pub use orchestrate::{FitOutcome, fit};
pub use request::{FitContext, FitRequest, FitRequestBuilder};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
