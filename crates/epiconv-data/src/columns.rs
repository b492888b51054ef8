//! Column Resolver
//!
//! Maps arbitrary input column names onto the canonical roles `location`,
//! `date`, `primary` and `secondary`. Renames happen in place so unrelated
//! columns keep their position and contents.

use crate::config::ColumnRoles;
use crate::error::{DataError, Result};
use polars::prelude::*;

/// Canonical location column
pub const LOCATION: &str = "location";
/// Canonical date column
pub const DATE: &str = "date";
/// Canonical primary observation column
pub const PRIMARY: &str = "primary";
/// Canonical secondary observation column
pub const SECONDARY: &str = "secondary";

/// Location label used when the input has a single, unnamed region
pub const GLOBAL_LOCATION: &str = "global";

/// Resolve all four canonical roles.
///
/// A missing `location` becomes a constant [`GLOBAL_LOCATION`] column unless an
/// override names one. `primary` and `secondary` must either already exist or
/// be named by an override. `date` has no override and must be present.
pub fn resolve_columns(mut frame: DataFrame, roles: &ColumnRoles) -> Result<DataFrame> {
    resolve_location(&mut frame, roles.location.as_deref())?;
    resolve_role(&mut frame, PRIMARY, roles.primary.as_deref())?;
    resolve_role(&mut frame, SECONDARY, roles.secondary.as_deref())?;

    if !has_column(&frame, DATE) {
        return Err(DataError::MissingRequiredColumn {
            role: DATE,
            column: None,
        });
    }

    Ok(frame)
}

pub(crate) fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_index(name).is_some()
}

fn resolve_location(frame: &mut DataFrame, location: Option<&str>) -> Result<()> {
    if has_column(frame, LOCATION) {
        return Ok(());
    }

    match location {
        Some(column) => rename_role(frame, LOCATION, column),
        None => {
            tracing::debug!("no location column, using '{GLOBAL_LOCATION}'");
            let global = Series::new(LOCATION.into(), vec![GLOBAL_LOCATION; frame.height()]);
            frame.with_column(global)?;
            Ok(())
        }
    }
}

fn resolve_role(frame: &mut DataFrame, role: &'static str, column: Option<&str>) -> Result<()> {
    if has_column(frame, role) {
        if let Some(column) = column.filter(|c| *c != role) {
            tracing::debug!(role, column, "canonical column present, ignoring override");
        }
        return Ok(());
    }

    match column {
        Some(column) => rename_role(frame, role, column),
        None => Err(DataError::MissingRequiredColumn { role, column: None }),
    }
}

fn rename_role(frame: &mut DataFrame, role: &'static str, column: &str) -> Result<()> {
    if !has_column(frame, column) {
        return Err(DataError::MissingRequiredColumn {
            role,
            column: Some(column.to_string()),
        });
    }
    frame.rename(column, role.into())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(frame: &DataFrame) -> Vec<String> {
        frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    #[test]
    fn test_canonical_columns_untouched() {
        let frame = df!(
            "location" => ["a", "b"],
            "date" => ["2020-01-01", "2020-01-01"],
            "primary" => [1i64, 2],
            "secondary" => [0i64, 1],
        )
        .unwrap();
        let resolved = resolve_columns(frame.clone(), &ColumnRoles::default()).unwrap();
        assert!(resolved.equals(&frame));
    }

    #[test]
    fn test_global_location_synthesized() {
        let frame = df!(
            "date" => ["2020-01-01", "2020-01-02"],
            "primary" => [1i64, 2],
            "secondary" => [0i64, 1],
        )
        .unwrap();
        let resolved = resolve_columns(frame, &ColumnRoles::default()).unwrap();
        let location = resolved.column(LOCATION).unwrap().str().unwrap();
        assert!(location.into_iter().all(|v| v == Some(GLOBAL_LOCATION)));
        assert_eq!(names(&resolved), vec!["date", "primary", "secondary", "location"]);
    }

    #[test]
    fn test_overrides_rename_in_place() {
        let frame = df!(
            "region" => ["a", "a"],
            "cases" => [10i64, 20],
            "date" => ["2020-01-01", "2020-01-02"],
            "deaths" => [0i64, 1],
            "note" => ["x", "y"],
        )
        .unwrap();
        let roles = ColumnRoles::default()
            .location("region")
            .primary("cases")
            .secondary("deaths");
        let resolved = resolve_columns(frame, &roles).unwrap();
        assert_eq!(
            names(&resolved),
            vec!["location", "primary", "date", "secondary", "note"]
        );
    }

    #[test]
    fn test_missing_primary_names_role() {
        let frame = df!(
            "region" => ["a"],
            "deaths" => [1i64],
            "date" => ["2020-01-01"],
        )
        .unwrap();
        let roles = ColumnRoles::default().location("region").secondary("deaths");
        match resolve_columns(frame, &roles) {
            Err(DataError::MissingRequiredColumn { role, column }) => {
                assert_eq!(role, "primary");
                assert!(column.is_none());
            }
            other => panic!("expected MissingRequiredColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_override_naming_absent_column() {
        let frame = df!(
            "date" => ["2020-01-01"],
            "primary" => [1i64],
            "deaths" => [1i64],
        )
        .unwrap();
        let roles = ColumnRoles::default().secondary("fatalities");
        match resolve_columns(frame, &roles) {
            Err(DataError::MissingRequiredColumn { role, column }) => {
                assert_eq!(role, "secondary");
                assert_eq!(column.as_deref(), Some("fatalities"));
            }
            other => panic!("expected MissingRequiredColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_date() {
        let frame = df!("primary" => [1i64], "secondary" => [1i64]).unwrap();
        match resolve_columns(frame, &ColumnRoles::default()) {
            Err(DataError::MissingRequiredColumn { role, .. }) => assert_eq!(role, "date"),
            other => panic!("expected MissingRequiredColumn, got {other:?}"),
        }
    }
}
