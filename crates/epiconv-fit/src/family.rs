//! Observation model families

use crate::error::FitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Link function between the expected value and the linear predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    /// Expected value is the convolution output itself
    #[default]
    Identity,
}

impl Link {
    /// Link name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
        }
    }
}

/// Distribution of the secondary observations around their expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObservationFamily {
    /// Poisson counts
    #[serde(rename = "poisson")]
    Poisson,
    /// Overdispersed counts
    #[default]
    #[serde(rename = "negbinomial", alias = "negative_binomial")]
    NegativeBinomial,
}

impl ObservationFamily {
    /// All supported families
    pub const ALL: [Self; 2] = [Self::Poisson, Self::NegativeBinomial];

    /// Family name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Poisson => "poisson",
            Self::NegativeBinomial => "negbinomial",
        }
    }

    /// Link function; the convolution is already on the observation scale.
    pub const fn link(self) -> Link {
        Link::Identity
    }
}

impl fmt::Display for ObservationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(link = \"{}\")", self.name(), self.link().name())
    }
}

impl FromStr for ObservationFamily {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poisson" => Ok(Self::Poisson),
            "negbinomial" | "negative_binomial" | "negative-binomial" => {
                Ok(Self::NegativeBinomial)
            }
            _ => Err(FitError::UnknownObservationFamily {
                requested: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_negative_binomial() {
        assert_eq!(
            ObservationFamily::default(),
            ObservationFamily::NegativeBinomial
        );
        assert_eq!(
            ObservationFamily::default().to_string(),
            "negbinomial(link = \"identity\")"
        );
    }

    #[rstest]
    #[case("poisson", ObservationFamily::Poisson)]
    #[case(" Poisson ", ObservationFamily::Poisson)]
    #[case("negbinomial", ObservationFamily::NegativeBinomial)]
    #[case("negative-binomial", ObservationFamily::NegativeBinomial)]
    fn test_parse(#[case] input: &str, #[case] expected: ObservationFamily) {
        assert_eq!(input.parse::<ObservationFamily>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "gaussian".parse::<ObservationFamily>().unwrap_err();
        assert!(err.to_string().contains("gaussian"));
    }
}
