//! Reading and validating uploaded CSV files
//!
//! Uploads carry the human-facing headers (`Actual Units`, `Version Date`,
//! ...). They are checked against the table's schema, renamed to the internal
//! snake_case columns and their dates normalised to `YYYY-MM-DD`.

use crate::error::{Result, StoreError};
use crate::schema::TableKind;
use planning_core::data::text_column;
use planning_core::DateParsing;
use polars::prelude::*;
use std::path::Path;

/// External headers of `kind` that `df` lacks, in schema order
pub fn validate_columns(kind: TableKind, df: &DataFrame) -> Vec<String> {
    let present = df.get_column_names();
    kind.external_columns()
        .into_iter()
        .filter(|column| !present.contains(column))
        .map(str::to_string)
        .collect()
}

/// Load a CSV file with every column read as text
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let df = CsvReader::from_path(path.as_ref())?
        .has_header(true)
        .infer_schema(Some(0))
        .finish()?;
    Ok(df)
}

/// Rename an upload to the internal schema, keeping only known columns.
///
/// Date columns are parsed under `dates`; with the lenient policy an
/// unparseable date becomes a missing value.
pub fn to_internal(kind: TableKind, df: &DataFrame, dates: DateParsing) -> Result<DataFrame> {
    let missing = validate_columns(kind, df);
    if !missing.is_empty() {
        return Err(StoreError::MissingColumns {
            table: kind.to_string(),
            missing,
        });
    }

    let mut columns = Vec::with_capacity(kind.renames().len());
    for (external, internal) in kind.renames() {
        let mut values = text_column(df, external)?;
        if kind.date_columns().contains(internal) {
            values = values
                .iter()
                .enumerate()
                .map(|(row, raw)| {
                    dates
                        .parse(raw.as_deref(), external, row)
                        .map(|date| date.map(|d| d.format("%Y-%m-%d").to_string()))
                })
                .collect::<planning_core::Result<Vec<_>>>()?;
        }
        columns.push(Series::new(internal, values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Read, validate and convert an upload file for `kind`
pub fn read_upload<P: AsRef<Path>>(kind: TableKind, path: P, dates: DateParsing) -> Result<DataFrame> {
    let raw = read_csv(path)?;
    to_internal(kind, &raw, dates)
}
