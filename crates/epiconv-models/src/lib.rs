#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/epiforecasts/epiconv/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod convolution;
pub mod error;
pub mod family;
pub mod formula;
pub mod priors;
pub mod registry;
pub mod specification;
pub mod stancode;

pub use convolution::{CONVOLUTION, CONVOLVE_FUNCTION, ConvolutionFamily, ConvolutionPriors};
pub use error::{ModelError, Result};
pub use family::ModelFamily;
pub use formula::{Formula, FormulaOverrides, SubFormula};
pub use priors::{Normal, Prior, PriorDistribution, PriorOverrides};
pub use registry::ModelRegistry;
pub use specification::ModelSpecification;
pub use stancode::{StanBlock, StanCode, StanFragment, version_marker};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
