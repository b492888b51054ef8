//! Observation preparation
//!
//! Runs the Column Resolver, the Convolution Window Calculator and the Type
//! Enforcer in sequence and lays the result out in the column order model
//! assembly expects:
//!
//! `location, date, time, index, init_obs, cstart, cmax, primary, secondary`
//!
//! Any other input columns follow in their original relative order.
//! Preparation is pure: the same input always yields the same frame.

use crate::columns::{DATE, LOCATION, PRIMARY, SECONDARY, resolve_columns};
use crate::config::{ColumnRoles, PrepareConfig};
use crate::enforce::coerce_count;
use crate::error::{DataError, Result};
use crate::window::{ConvolutionWindow, WindowParams, assign_windows, time_offsets};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column order of a prepared dataset
pub const PREPARED_COLUMNS: [&str; 9] = [
    LOCATION,
    DATE,
    "time",
    "index",
    "init_obs",
    "cstart",
    "cmax",
    PRIMARY,
    SECONDARY,
];

/// Resolve, window and type-check a table of observations.
///
/// Fails on the first invalid element; no partial output is produced.
pub fn prepare_observations(
    frame: DataFrame,
    roles: &ColumnRoles,
    config: &PrepareConfig,
) -> Result<DataFrame> {
    let params = WindowParams::from_config(config)?;
    let resolved = normalize_keys(resolve_columns(frame, roles)?)?;

    let sorted = resolved.sort(
        [LOCATION, DATE],
        SortMultipleOptions::default().with_maintain_order(true),
    )?;

    let locations = string_values(sorted.column(LOCATION)?)?;
    let days = date_values(sorted.column(DATE)?)?;
    check_unique(&locations, &days)?;

    let windows = assign_windows(locations.iter().copied(), &params)?;
    let time = time_offsets(&days);
    let primary = coerce_count(sorted.column(PRIMARY)?)?;
    let secondary = coerce_count(sorted.column(SECONDARY)?)?;

    let location_count = windows.iter().filter(|w| w.index == 1).count();
    let short = short_locations(&windows, config.initial_obs);
    if short > 0 {
        tracing::warn!(
            locations = short,
            initial_obs = config.initial_obs,
            "locations shorter than the burn-in period are entirely burn-in"
        );
    }
    tracing::debug!(
        rows = sorted.height(),
        locations = location_count,
        initial_obs = config.initial_obs,
        max_convolution = config.max_convolution,
        "prepared observations"
    );

    let mut columns: Vec<Column> = vec![
        sorted.column(LOCATION)?.clone(),
        sorted.column(DATE)?.clone(),
        int_column("time", time),
        int_column("index", windows.iter().map(|w| w.index).collect()),
        int_column("init_obs", windows.iter().map(|w| w.init_obs).collect()),
        int_column("cstart", windows.iter().map(|w| w.cstart).collect()),
        int_column("cmax", windows.iter().map(|w| w.cmax).collect()),
        int_column(PRIMARY, primary),
        int_column(SECONDARY, secondary),
    ];
    for name in replaced_columns(&sorted) {
        tracing::warn!(
            column = name,
            "input column replaced by the derived column of the same name"
        );
    }
    columns.extend(
        sorted
            .get_columns()
            .iter()
            .filter(|c| !PREPARED_COLUMNS.contains(&c.name().as_str()))
            .cloned(),
    );

    Ok(DataFrame::new(columns)?)
}

/// Input columns whose names collide with derived columns.
fn replaced_columns(frame: &DataFrame) -> Vec<&'static str> {
    PREPARED_COLUMNS[2..7]
        .iter()
        .copied()
        .filter(|name| frame.get_column_index(name).is_some())
        .collect()
}

fn int_column(name: &str, values: Vec<i32>) -> Column {
    Series::new(name.into(), values).into()
}

/// Number of locations whose record count does not exceed `initial_obs`.
fn short_locations(windows: &[ConvolutionWindow], initial_obs: i64) -> usize {
    windows
        .iter()
        .zip(windows.iter().skip(1).map(Some).chain(std::iter::once(None)))
        .filter(|(w, next)| next.is_none_or(|n| n.index == 1) && i64::from(w.index) <= initial_obs)
        .count()
}

/// Cast `location` to strings and `date` to a polars `Date`.
fn normalize_keys(mut frame: DataFrame) -> Result<DataFrame> {
    let location = frame.column(LOCATION)?;
    if location.dtype() != &DataType::String {
        let cast = location.cast(&DataType::String)?;
        frame.with_column(cast)?;
    }

    let date = frame.column(DATE)?;
    match date.dtype().clone() {
        DataType::Date => {}
        DataType::String => {
            let days = date
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| value.map(|v| parse_date(row, v)).transpose())
                .collect::<Result<Vec<Option<i32>>>>()?;
            let parsed = Series::new(DATE.into(), days).cast(&DataType::Date)?;
            frame.with_column(parsed)?;
        }
        other => {
            return Err(DataError::UnsupportedDateType {
                column: DATE,
                dtype: other.to_string(),
            });
        }
    }

    Ok(frame)
}

fn parse_date(row: usize, value: &str) -> Result<i32> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DataError::InvalidDate {
            row,
            value: value.to_string(),
        }
    })?;
    epoch_days(date).ok_or_else(|| DataError::InvalidDate {
        row,
        value: value.to_string(),
    })
}

/// Days since 1970-01-01.
pub(crate) fn epoch_days(date: NaiveDate) -> Option<i32> {
    i32::try_from(date.signed_duration_since(NaiveDate::default()).num_days()).ok()
}

pub(crate) fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(Duration::days(i64::from(days)))
}

fn string_values(column: &Column) -> Result<Vec<&str>> {
    let name = column.name().as_str();
    column
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| DataError::NullValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

fn date_values(column: &Column) -> Result<Vec<i32>> {
    let days = column.cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| DataError::NullValue {
                column: DATE.to_string(),
                row,
            })
        })
        .collect()
}

/// Sorted input makes duplicate keys adjacent.
fn check_unique(locations: &[&str], days: &[i32]) -> Result<()> {
    let duplicate = locations
        .windows(2)
        .zip(days.windows(2))
        .find(|(l, d)| l[0] == l[1] && d[0] == d[1]);

    match duplicate {
        Some((l, d)) => Err(DataError::DuplicateObservation {
            location: l[0].to_string(),
            date: from_epoch_days(d[0]).map_or_else(|| d[0].to_string(), |x| x.to_string()),
        }),
        None => Ok(()),
    }
}

/// One row of a prepared dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRecord {
    /// Location label
    pub location: String,
    /// Observation date
    pub date: NaiveDate,
    /// Days since the earliest date in the dataset
    pub time: i32,
    /// 1-based rank within the location
    pub index: i32,
    /// Burn-in flag
    pub init_obs: i32,
    /// First index of the convolution window
    pub cstart: i32,
    /// Convolution window length
    pub cmax: i32,
    /// Primary observation count
    pub primary: i32,
    /// Secondary observation count
    pub secondary: i32,
}

/// A prepared dataset tagged with the model family that produced it
///
/// Model assembly dispatches on [`PreparedData::family`] rather than on the
/// data's contents.
#[derive(Debug, Clone)]
pub struct PreparedData {
    frame: DataFrame,
    family: String,
    config: PrepareConfig,
}

impl PreparedData {
    /// Wrap a prepared frame with its family tag and preparation settings.
    pub fn new(frame: DataFrame, family: impl Into<String>, config: PrepareConfig) -> Self {
        Self {
            frame,
            family: family.into(),
            config,
        }
    }

    /// Prepared frame
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume and return the prepared frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Model family tag
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Settings used during preparation
    pub const fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Number of prepared rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Distinct locations in sorted order.
    pub fn locations(&self) -> Result<Vec<String>> {
        let mut locations: Vec<String> = string_values(self.frame.column(LOCATION)?)?
            .into_iter()
            .map(str::to_string)
            .collect();
        locations.dedup();
        Ok(locations)
    }

    /// Typed view of the canonical columns.
    pub fn records(&self) -> Result<Vec<PreparedRecord>> {
        let locations = string_values(self.frame.column(LOCATION)?)?;
        let days = date_values(self.frame.column(DATE)?)?;
        let ints = PREPARED_COLUMNS[2..]
            .iter()
            .map(|name| int_values(self.frame.column(name)?))
            .collect::<Result<Vec<_>>>()?;

        locations
            .iter()
            .zip(days)
            .enumerate()
            .map(|(row, (location, day))| {
                let date = from_epoch_days(day).ok_or_else(|| DataError::InvalidDate {
                    row,
                    value: day.to_string(),
                })?;
                Ok(PreparedRecord {
                    location: (*location).to_string(),
                    date,
                    time: ints[0][row],
                    index: ints[1][row],
                    init_obs: ints[2][row],
                    cstart: ints[3][row],
                    cmax: ints[4][row],
                    primary: ints[5][row],
                    secondary: ints[6][row],
                })
            })
            .collect()
    }
}

fn int_values(column: &Column) -> Result<Vec<i32>> {
    let name = column.name().as_str();
    column
        .i32()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| DataError::NullValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}
