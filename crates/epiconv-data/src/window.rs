//! Convolution Window Calculator
//!
//! Assigns each observation its position within its location, a burn-in
//! flag and the span of preceding indices its secondary value is convolved
//! over. Input must already be sorted by (`location`, `date`).
//!
//! For a record at 1-based position `index`:
//!
//! ```text
//! init_obs = index <= initial_obs
//! cstart   = max(1, index - max_convolution)
//! cmax     = index - cstart + 1
//! ```

use crate::config::PrepareConfig;
use crate::error::{DataError, Result};

/// Window metadata for a single prepared observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvolutionWindow {
    /// 1-based rank within the location's date-sorted sequence
    pub index: i32,
    /// 1 while the record is inside the burn-in period, else 0
    pub init_obs: i32,
    /// 1-based first index covered by the convolution window
    pub cstart: i32,
    /// Window length, `index - cstart + 1`
    pub cmax: i32,
}

/// Validated integer window parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    initial_obs: i32,
    max_convolution: i32,
}

impl WindowParams {
    /// Build window parameters from a preparation config.
    pub fn from_config(config: &PrepareConfig) -> Result<Self> {
        config.validate()?;
        let initial_obs = i32::try_from(config.initial_obs)
            .map_err(|_| DataError::invalid_parameter("initial_obs", "out of range"))?;
        let max_convolution = i32::try_from(config.max_convolution)
            .map_err(|_| DataError::invalid_parameter("max_convolution", "out of range"))?;
        Ok(Self {
            initial_obs,
            max_convolution,
        })
    }

    /// Window for the record at 1-based position `index`.
    pub const fn window(&self, index: i32) -> ConvolutionWindow {
        let lower = index.saturating_sub(self.max_convolution);
        let cstart = if lower < 1 { 1 } else { lower };
        ConvolutionWindow {
            index,
            init_obs: (index <= self.initial_obs) as i32,
            cstart,
            cmax: index - cstart + 1,
        }
    }
}

/// Assign windows in one pass over location keys sorted by (location, date).
///
/// The per-location counter resets whenever the key changes, so every
/// location starts again at `index = 1`.
pub fn assign_windows<'a, I>(locations: I, params: &WindowParams) -> Result<Vec<ConvolutionWindow>>
where
    I: IntoIterator<Item = &'a str>,
{
    let locations = locations.into_iter();
    let mut windows = Vec::with_capacity(locations.size_hint().0);
    let mut current: Option<&str> = None;
    let mut index: i32 = 0;

    for location in locations {
        if current == Some(location) {
            index = index.checked_add(1).ok_or_else(|| DataError::NonIntegerValue {
                column: "index".to_string(),
                row: windows.len(),
                value: format!("{} + 1", i32::MAX),
            })?;
        } else {
            current = Some(location);
            index = 1;
        }
        windows.push(params.window(index));
    }

    Ok(windows)
}

/// Day offsets from the earliest date across the whole dataset.
///
/// All locations share this axis; `dates` are days since the Unix epoch.
pub fn time_offsets(dates: &[i32]) -> Vec<i32> {
    let Some(&origin) = dates.iter().min() else {
        return Vec::new();
    };
    dates.iter().map(|&d| d - origin).collect()
}
