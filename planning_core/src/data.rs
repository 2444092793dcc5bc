//! Sales and forecast records and their tabular form
//!
//! Rows reach the core either as typed records or as polars `DataFrame`s
//! whose column names follow the internal schema (`date`, `sku`,
//! `actual_units`, ...). The helpers here pull typed columns out of a frame
//! regardless of the dtype the CSV reader inferred.

use crate::dates::DateParsing;
use crate::error::{PlanningError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the internal sales schema
pub const SALES_COLUMNS: [&str; 5] = ["date", "sku", "actual_units", "geolocation", "warehouse"];

/// Column names of the internal forecasts schema
pub const FORECAST_COLUMNS: [&str; 7] = [
    "version_date",
    "date",
    "sku",
    "forecast_units",
    "statistical_units",
    "geolocation",
    "warehouse",
];

/// One observed sales quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub sku: String,
    pub actual_units: i64,
    pub geolocation: Option<String>,
    pub warehouse: Option<String>,
}

/// One forecast line of a forecast version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub version_date: NaiveDate,
    pub date: NaiveDate,
    pub sku: String,
    pub forecast_units: Option<i64>,
    pub statistical_units: Option<i64>,
    pub geolocation: Option<String>,
    pub warehouse: Option<String>,
}

/// Fail with the list of columns absent from `df`
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlanningError::InvalidArgument(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| PlanningError::InvalidArgument(format!("missing required column: {}", name)))
}

/// Numeric column as floats; nulls and non-numeric cells become `None`
pub fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = column(df, name)?;
    let values = match col.dtype() {
        DataType::Float64 => col.f64()?.into_iter().collect(),
        DataType::Utf8 => col
            .utf8()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?.into_iter().collect()
        }
    };
    Ok(values)
}

/// Integer column; floats are truncated
pub fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    Ok(float_column(df, name)?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()).map(|x| x as i64))
        .collect())
}

/// Column rendered as text; empty strings count as missing
pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = column(df, name)?;
    let cast;
    let text = if matches!(col.dtype(), DataType::Utf8) {
        col.utf8()?
    } else {
        cast = col.cast(&DataType::Utf8)?;
        cast.utf8()?
    };

    Ok(text
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

/// Date column parsed under `policy`
pub fn date_column(df: &DataFrame, name: &str, policy: DateParsing) -> Result<Vec<Option<NaiveDate>>> {
    text_column(df, name)?
        .iter()
        .enumerate()
        .map(|(row, raw)| policy.parse(raw.as_deref(), name, row))
        .collect()
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| {
        PlanningError::InvalidArgument(format!("missing value in column '{}' at row {}", column, row))
    })
}

/// Build sales records from a frame in the internal schema.
///
/// Under the lenient date policy rows whose date cannot be parsed are skipped.
pub fn sales_from_frame(df: &DataFrame, policy: DateParsing) -> Result<Vec<SalesRecord>> {
    require_columns(df, &SALES_COLUMNS)?;

    let dates = date_column(df, "date", policy)?;
    let skus = text_column(df, "sku")?;
    let units = int_column(df, "actual_units")?;
    let geolocations = text_column(df, "geolocation")?;
    let warehouses = text_column(df, "warehouse")?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(date) = dates[row] else { continue };
        records.push(SalesRecord {
            date,
            sku: required(skus[row].clone(), "sku", row)?,
            actual_units: required(units[row], "actual_units", row)?,
            geolocation: geolocations[row].clone(),
            warehouse: warehouses[row].clone(),
        });
    }

    Ok(records)
}

/// Build forecast records from a frame in the internal schema.
pub fn forecasts_from_frame(df: &DataFrame, policy: DateParsing) -> Result<Vec<ForecastRecord>> {
    require_columns(df, &FORECAST_COLUMNS)?;

    let version_dates = date_column(df, "version_date", policy)?;
    let dates = date_column(df, "date", policy)?;
    let skus = text_column(df, "sku")?;
    let forecast_units = int_column(df, "forecast_units")?;
    let statistical_units = int_column(df, "statistical_units")?;
    let geolocations = text_column(df, "geolocation")?;
    let warehouses = text_column(df, "warehouse")?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let (Some(version_date), Some(date)) = (version_dates[row], dates[row]) else {
            continue;
        };
        records.push(ForecastRecord {
            version_date,
            date,
            sku: required(skus[row].clone(), "sku", row)?,
            forecast_units: forecast_units[row],
            statistical_units: statistical_units[row],
            geolocation: geolocations[row].clone(),
            warehouse: warehouses[row].clone(),
        });
    }

    Ok(records)
}

fn iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Sales records as a frame in the internal schema
pub fn sales_frame(records: &[SalesRecord]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("date", records.iter().map(|r| iso(&r.date)).collect::<Vec<_>>()),
        Series::new("sku", records.iter().map(|r| r.sku.clone()).collect::<Vec<_>>()),
        Series::new(
            "actual_units",
            records.iter().map(|r| r.actual_units).collect::<Vec<_>>(),
        ),
        Series::new(
            "geolocation",
            records.iter().map(|r| r.geolocation.clone()).collect::<Vec<_>>(),
        ),
        Series::new(
            "warehouse",
            records.iter().map(|r| r.warehouse.clone()).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

/// Forecast records as a frame in the internal schema
pub fn forecasts_frame(records: &[ForecastRecord]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "version_date",
            records.iter().map(|r| iso(&r.version_date)).collect::<Vec<_>>(),
        ),
        Series::new("date", records.iter().map(|r| iso(&r.date)).collect::<Vec<_>>()),
        Series::new("sku", records.iter().map(|r| r.sku.clone()).collect::<Vec<_>>()),
        Series::new(
            "forecast_units",
            records.iter().map(|r| r.forecast_units).collect::<Vec<_>>(),
        ),
        Series::new(
            "statistical_units",
            records.iter().map(|r| r.statistical_units).collect::<Vec<_>>(),
        ),
        Series::new(
            "geolocation",
            records.iter().map(|r| r.geolocation.clone()).collect::<Vec<_>>(),
        ),
        Series::new(
            "warehouse",
            records.iter().map(|r| r.warehouse.clone()).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}
