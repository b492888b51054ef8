//! CSV ingest and export.
//!
//! Observation files are read into a [`DataFrame`] with each column typed as
//! integer, float or string depending on what all of its non-empty cells
//! parse as. Empty cells become nulls. Prepared records are written back out
//! through `serde`.

use crate::error::Result;
use crate::prepare::PreparedRecord;
use polars::prelude::*;
use std::io::{Read, Write};
use std::path::Path;

/// Read an observation CSV from disk.
pub fn read_observations_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let file = std::fs::File::open(path.as_ref())?;
    read_observations(file)
}

/// Read observations from any CSV source with a header row.
pub fn read_observations<R: Read>(source: R) -> Result<DataFrame> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push(value.to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, &values))
        .collect();

    tracing::debug!(columns = headers.len(), "read observation csv");
    Ok(DataFrame::new(columns)?)
}

fn infer_column(name: &str, values: &[String]) -> Column {
    let present = || values.iter().filter_map(|v| non_empty(v));

    let series = if present().all(|v| v.parse::<i64>().is_ok()) {
        let parsed: Vec<Option<i64>> = values
            .iter()
            .map(|v| non_empty(v).and_then(|v| v.parse().ok()))
            .collect();
        Series::new(name.into(), parsed)
    } else if present().all(|v| v.parse::<f64>().is_ok()) {
        let parsed: Vec<Option<f64>> = values
            .iter()
            .map(|v| non_empty(v).and_then(|v| v.parse().ok()))
            .collect();
        Series::new(name.into(), parsed)
    } else {
        let parsed: Vec<Option<&str>> = values.iter().map(|v| non_empty(v)).collect();
        Series::new(name.into(), parsed)
    };
    series.into()
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Write prepared records as CSV with a header row.
pub fn write_prepared<W: Write>(records: &[PreparedRecord], sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write prepared records to a CSV file.
pub fn write_prepared_csv(records: &[PreparedRecord], path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_prepared(records, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
region,date,cases,deaths,rate
north,2020-03-01,10,0,0.5
north,2020-03-02,20,,1.5
";

    #[test]
    fn test_column_types_inferred() {
        let frame = read_observations(SAMPLE.as_bytes()).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column("region").unwrap().dtype(), &DataType::String);
        assert_eq!(frame.column("date").unwrap().dtype(), &DataType::String);
        assert_eq!(frame.column("cases").unwrap().dtype(), &DataType::Int64);
        assert_eq!(frame.column("deaths").unwrap().dtype(), &DataType::Int64);
        assert_eq!(frame.column("rate").unwrap().dtype(), &DataType::Float64);
        assert_eq!(frame.column("deaths").unwrap().null_count(), 1);
    }

    #[test]
    fn test_write_prepared() {
        let records = vec![PreparedRecord {
            location: "global".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            time: 0,
            index: 1,
            init_obs: 1,
            cstart: 1,
            cmax: 1,
            primary: 10,
            secondary: 0,
        }];
        let mut out = Vec::new();
        write_prepared(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "location,date,time,index,init_obs,cstart,cmax,primary,secondary\n\
             global,2020-03-01,0,1,1,1,1,10,0\n"
        );
    }
}
