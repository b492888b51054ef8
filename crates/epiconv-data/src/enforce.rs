//! Type Enforcer
//!
//! Lossless integer coercion for count columns. Fractional, out-of-range and
//! non-numeric values are rejected; nothing is rounded or truncated.

use crate::error::{DataError, Result};
use polars::prelude::*;

/// Coerce a column to 32-bit integers without changing any value.
pub fn coerce_integer(column: &Column) -> Result<Vec<i32>> {
    let name = column.name().as_str();
    let dtype = column.dtype();

    if dtype.is_unsigned_integer() {
        // u64 values above i64::MAX would turn into nulls through Int64
        let values = column.cast(&DataType::UInt64)?;
        values
            .u64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or_else(|| null_value(name, row))?;
                i32::try_from(value).map_err(|_| non_integer(name, row, value))
            })
            .collect()
    } else if dtype.is_integer() || dtype == &DataType::Boolean {
        let values = column.cast(&DataType::Int64)?;
        values
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or_else(|| null_value(name, row))?;
                i32::try_from(value).map_err(|_| non_integer(name, row, value))
            })
            .collect()
    } else if dtype.is_float() {
        let values = column.cast(&DataType::Float64)?;
        values
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or_else(|| null_value(name, row))?;
                float_to_i32(value).ok_or_else(|| non_integer(name, row, value))
            })
            .collect()
    } else if dtype == &DataType::String {
        column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or_else(|| null_value(name, row))?;
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(float_to_i32)
                    .ok_or_else(|| non_integer(name, row, value))
            })
            .collect()
    } else {
        Err(DataError::NonIntegerValue {
            column: name.to_string(),
            row: 0,
            value: format!("<{dtype}>"),
        })
    }
}

/// Coerce a count column, additionally rejecting negative counts.
pub fn coerce_count(column: &Column) -> Result<Vec<i32>> {
    let values = coerce_integer(column)?;
    if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| **v < 0) {
        return Err(DataError::NegativeCount {
            column: column.name().to_string(),
            row,
            value: i64::from(value),
        });
    }
    Ok(values)
}

fn float_to_i32(value: f64) -> Option<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

fn null_value(column: &str, row: usize) -> DataError {
    DataError::NullValue {
        column: column.to_string(),
        row,
    }
}

fn non_integer(column: &str, row: usize, value: impl ToString) -> DataError {
    DataError::NonIntegerValue {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_column() {
        let col = Column::from(Series::new("primary".into(), [1i64, 2, 3]));
        assert_eq!(coerce_integer(&col).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_whole_floats_accepted() {
        let col = Column::from(Series::new("primary".into(), [10.0f64, 0.0, 500.0]));
        assert_eq!(coerce_count(&col).unwrap(), vec![10, 0, 500]);
    }

    #[test]
    fn test_fractional_rejected_not_rounded() {
        let col = Column::from(Series::new("secondary".into(), [1.0f64, 2.5, 3.0]));
        match coerce_count(&col) {
            Err(DataError::NonIntegerValue { column, row, value }) => {
                assert_eq!(column, "secondary");
                assert_eq!(row, 1);
                assert_eq!(value, "2.5");
            }
            other => panic!("expected NonIntegerValue, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let col = Column::from(Series::new("primary".into(), [i64::from(i32::MAX) + 1]));
        assert!(matches!(
            coerce_integer(&col),
            Err(DataError::NonIntegerValue { .. })
        ));
    }

    #[test]
    fn test_null_rejected() {
        let col = Column::from(Series::new("primary".into(), [Some(1i64), None]));
        match coerce_integer(&col) {
            Err(DataError::NullValue { column, row }) => {
                assert_eq!(column, "primary");
                assert_eq!(row, 1);
            }
            other => panic!("expected NullValue, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_count_rejected() {
        let col = Column::from(Series::new("secondary".into(), [3i32, -1]));
        match coerce_count(&col) {
            Err(DataError::NegativeCount { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, -1);
            }
            other => panic!("expected NegativeCount, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_strings() {
        let col = Column::from(Series::new("primary".into(), ["4", " 5 "]));
        assert_eq!(coerce_integer(&col).unwrap(), vec![4, 5]);

        let col = Column::from(Series::new("primary".into(), ["10.0", "20", "3e1"]));
        assert_eq!(coerce_integer(&col).unwrap(), vec![10, 20, 30]);

        for bad in ["many", "2.5", "NaN", "inf", "3000000000"] {
            let col = Column::from(Series::new("primary".into(), ["4", bad]));
            match coerce_integer(&col) {
                Err(DataError::NonIntegerValue { row, value, .. }) => {
                    assert_eq!(row, 1);
                    assert_eq!(value, bad);
                }
                other => panic!("expected NonIntegerValue for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_large_unsigned_rejected_not_null() {
        let col = Column::from(Series::new("primary".into(), [1u64, u64::MAX]));
        match coerce_integer(&col) {
            Err(DataError::NonIntegerValue { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, u64::MAX.to_string());
            }
            other => panic!("expected NonIntegerValue, got {other:?}"),
        }

        let col = Column::from(Series::new("secondary".into(), [0u32, u32::MAX]));
        match coerce_count(&col) {
            Err(DataError::NonIntegerValue { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "4294967295");
            }
            other => panic!("expected NonIntegerValue, got {other:?}"),
        }

        let col = Column::from(Series::new("secondary".into(), [0u32, 7]));
        assert_eq!(coerce_count(&col).unwrap(), vec![0, 7]);
    }
}
