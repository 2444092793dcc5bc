//! Rendering results as CSV or JSON

use crate::error::{PlannerError, Result};
use clap::ValueEnum;
use planning_core::data::text_column;
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Write serializable rows in `format`
pub fn write_rows<T: Serialize, W: Write>(rows: &[T], format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write a text frame in `format`; missing cells are empty (CSV) or null (JSON)
pub fn write_frame<W: Write>(df: &DataFrame, format: OutputFormat, out: W) -> Result<()> {
    let names = df.get_column_names();
    let columns = names
        .iter()
        .map(|name| text_column(df, name))
        .collect::<planning_core::Result<Vec<_>>>()
        .map_err(PlannerError::from)?;

    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(&names)?;
            for row in 0..df.height() {
                writer.write_record(columns.iter().map(|c| c[row].as_deref().unwrap_or("")))?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let records: Vec<Map<String, Value>> = (0..df.height())
                .map(|row| {
                    names
                        .iter()
                        .zip(&columns)
                        .map(|(name, column)| {
                            let value = column[row].clone().map_or(Value::Null, Value::String);
                            (name.to_string(), value)
                        })
                        .collect()
                })
                .collect();
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, &records)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct Row {
        date: &'static str,
        value: f64,
    }

    #[test]
    fn test_rows_as_csv() {
        let mut buffer = Vec::new();
        let rows = [
            Row { date: "2024-01-01", value: 1.5 },
            Row { date: "2024-02-01", value: 2.0 },
        ];
        write_rows(&rows, OutputFormat::Csv, &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "date,value\n2024-01-01,1.5\n2024-02-01,2.0\n"
        );
    }

    #[test]
    fn test_frame_as_json() {
        let df = DataFrame::new(vec![
            Series::new("sku", vec![Some("A"), None]),
            Series::new("abc", vec![Some("X"), Some("Y")]),
        ])
        .unwrap();
        let mut buffer = Vec::new();
        write_frame(&df, OutputFormat::Json, &mut buffer).unwrap();

        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed[0]["sku"], "A");
        assert_eq!(parsed[1]["sku"], Value::Null);
        assert_eq!(parsed[1]["abc"], "Y");
    }
}
