//! Preparation configuration
//!
//! Column-role overrides and the burn-in / convolution window parameters.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// Default number of burn-in observations per location
pub const DEFAULT_INITIAL_OBS: i64 = 14;

/// Default maximum convolution lag
pub const DEFAULT_MAX_CONVOLUTION: i64 = 30;

/// Parameters controlling the convolution window calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Leading observations per location flagged as burn-in (default: 14)
    pub initial_obs: i64,
    /// Maximum lag covered by a convolution window (default: 30)
    pub max_convolution: i64,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            initial_obs: DEFAULT_INITIAL_OBS,
            max_convolution: DEFAULT_MAX_CONVOLUTION,
        }
    }
}

impl PrepareConfig {
    /// Create a validated configuration.
    pub fn new(initial_obs: i64, max_convolution: i64) -> Result<Self> {
        let config = Self {
            initial_obs,
            max_convolution,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from loosely-typed numeric values.
    ///
    /// Values must be finite whole numbers; a fractional `initial_obs` or
    /// `max_convolution` is rejected rather than truncated.
    pub fn from_numeric(initial_obs: f64, max_convolution: f64) -> Result<Self> {
        Self::new(
            whole_number("initial_obs", initial_obs)?,
            whole_number("max_convolution", max_convolution)?,
        )
    }

    /// Check parameter domains: `initial_obs >= 0`, `max_convolution >= 1`.
    pub fn validate(&self) -> Result<()> {
        if self.initial_obs < 0 {
            return Err(DataError::invalid_parameter(
                "initial_obs",
                format!("must be non-negative, got {}", self.initial_obs),
            ));
        }
        if self.max_convolution < 1 {
            return Err(DataError::invalid_parameter(
                "max_convolution",
                format!("must be a positive integer, got {}", self.max_convolution),
            ));
        }
        if i32::try_from(self.initial_obs).is_err() {
            return Err(DataError::invalid_parameter(
                "initial_obs",
                "must fit in a 32-bit integer",
            ));
        }
        if i32::try_from(self.max_convolution).is_err() {
            return Err(DataError::invalid_parameter(
                "max_convolution",
                "must fit in a 32-bit integer",
            ));
        }
        Ok(())
    }
}

fn whole_number(name: &'static str, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(DataError::invalid_parameter(
            name,
            format!("must be finite, got {value}"),
        ));
    }
    if value.fract() != 0.0 {
        return Err(DataError::invalid_parameter(
            name,
            format!("must be an integer, got {value}"),
        ));
    }
    if value.abs() > i32::MAX as f64 {
        return Err(DataError::invalid_parameter(
            name,
            format!("{value} is out of range"),
        ));
    }
    Ok(value as i64)
}

/// Optional column-name overrides for the canonical roles
///
/// An override is only consulted when the canonical column is absent, so a
/// dataset that already has a `primary` column keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Column to use as `location`
    pub location: Option<String>,
    /// Column to use as `primary`
    pub primary: Option<String>,
    /// Column to use as `secondary`
    pub secondary: Option<String>,
}

impl ColumnRoles {
    /// Set the `location` override.
    pub fn location(mut self, column: impl Into<String>) -> Self {
        self.location = Some(column.into());
        self
    }

    /// Set the `primary` override.
    pub fn primary(mut self, column: impl Into<String>) -> Self {
        self.primary = Some(column.into());
        self
    }

    /// Set the `secondary` override.
    pub fn secondary(mut self, column: impl Into<String>) -> Self {
        self.secondary = Some(column.into());
        self
    }
}
