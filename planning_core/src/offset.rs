//! Lag-offset alignment of forecasts against actuals
//!
//! A forecast made for month M with a lead time of k months is compared with
//! the actuals of month M + k. Forecast dates are shifted by the offset, then
//! inner-joined with actuals on `(date, sku, geolocation, warehouse)`. Rows
//! without a partner on the other side are dropped. A missing geolocation or
//! warehouse only matches another missing one.

use crate::data::{
    date_column, float_column, require_columns, text_column, ForecastRecord, SalesRecord,
};
use crate::dates::{shift_months, DateParsing};
use crate::error::{PlanningError, Result};
use crate::kpi::{aggregate_rows, KpiInput, KpiLevel, KpiRow};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Which forecast quantity is compared against actuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMeasure {
    /// Planner forecast (`forecast_units`)
    #[default]
    Planner,
    /// Statistical baseline (`statistical_units`)
    Statistical,
}

impl ForecastMeasure {
    /// Column holding this measure in the forecasts schema
    pub fn column(&self) -> &'static str {
        match self {
            ForecastMeasure::Planner => "forecast_units",
            ForecastMeasure::Statistical => "statistical_units",
        }
    }

    fn value(&self, record: &ForecastRecord) -> Option<i64> {
        match self {
            ForecastMeasure::Planner => record.forecast_units,
            ForecastMeasure::Statistical => record.statistical_units,
        }
    }
}

impl FromStr for ForecastMeasure {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "planner" | "forecast" | "forecast_units" => Ok(ForecastMeasure::Planner),
            "statistical" | "statistical_units" => Ok(ForecastMeasure::Statistical),
            other => Err(PlanningError::InvalidArgument(format!(
                "unknown forecast measure '{}', expected 'planner' or 'statistical'",
                other
            ))),
        }
    }
}

/// Composite join key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    pub date: NaiveDate,
    pub sku: String,
    pub geolocation: Option<String>,
    pub warehouse: Option<String>,
}

/// A forecast row joined with the actual it is measured against
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    /// Forecast date after the offset, equal to the actuals date
    pub date: NaiveDate,
    pub sku: String,
    pub geolocation: Option<String>,
    pub warehouse: Option<String>,
    pub version_date: NaiveDate,
    pub forecast_units: Option<i64>,
    pub actual_units: i64,
}

impl AlignedRow {
    /// KPI input of this pairing, dated at the actuals month
    pub fn kpi_input(&self) -> KpiInput {
        KpiInput {
            date: self.date,
            actual: Some(self.actual_units as f64),
            forecast: self.forecast_units.map(|f| f as f64),
        }
    }
}

/// Index pairs `(forecast, actual)` of every matching key, in forecast order
fn inner_join(forecasts: &[Option<JoinKey>], actuals: &[Option<JoinKey>]) -> Vec<(usize, usize)> {
    let mut index: HashMap<&JoinKey, Vec<usize>> = HashMap::new();
    for (i, key) in actuals.iter().enumerate() {
        if let Some(key) = key {
            index.entry(key).or_default().push(i);
        }
    }

    forecasts
        .iter()
        .enumerate()
        .filter_map(|(i, key)| key.as_ref().and_then(|k| index.get(k)).map(|m| (i, m)))
        .flat_map(|(i, matches)| matches.iter().map(move |&j| (i, j)))
        .collect()
}

/// Shift forecasts by `offset_months` and join them with actuals.
///
/// Every pairing of equal keys is produced, so duplicate keys on both sides
/// multiply.
pub fn join(
    forecasts: &[ForecastRecord],
    actuals: &[SalesRecord],
    offset_months: i32,
    measure: ForecastMeasure,
) -> Vec<AlignedRow> {
    let forecast_keys: Vec<Option<JoinKey>> = forecasts
        .iter()
        .map(|f| {
            shift_months(f.date, offset_months).map(|date| JoinKey {
                date,
                sku: f.sku.clone(),
                geolocation: f.geolocation.clone(),
                warehouse: f.warehouse.clone(),
            })
        })
        .collect();
    let actual_keys: Vec<Option<JoinKey>> = actuals
        .iter()
        .map(|a| {
            Some(JoinKey {
                date: a.date,
                sku: a.sku.clone(),
                geolocation: a.geolocation.clone(),
                warehouse: a.warehouse.clone(),
            })
        })
        .collect();

    inner_join(&forecast_keys, &actual_keys)
        .into_iter()
        .filter_map(|(i, j)| {
            let key = forecast_keys[i].as_ref()?;
            Some(AlignedRow {
                date: key.date,
                sku: key.sku.clone(),
                geolocation: key.geolocation.clone(),
                warehouse: key.warehouse.clone(),
                version_date: forecasts[i].version_date,
                forecast_units: measure.value(&forecasts[i]),
                actual_units: actuals[j].actual_units,
            })
        })
        .collect()
}

/// Monthly KPIs of planner forecasts shifted by `offset_months`
pub fn align(forecasts: &[ForecastRecord], actuals: &[SalesRecord], offset_months: i32) -> Vec<KpiRow> {
    align_with(forecasts, actuals, offset_months, ForecastMeasure::Planner)
}

/// Monthly KPIs of the chosen forecast measure shifted by `offset_months`
pub fn align_with(
    forecasts: &[ForecastRecord],
    actuals: &[SalesRecord],
    offset_months: i32,
    measure: ForecastMeasure,
) -> Vec<KpiRow> {
    let rows: Vec<KpiInput> = join(forecasts, actuals, offset_months, measure)
        .iter()
        .map(AlignedRow::kpi_input)
        .collect();
    aggregate_rows(&rows, KpiLevel::Monthly)
}

const KEY_COLUMNS: [&str; 4] = ["date", "sku", "geolocation", "warehouse"];

fn frame_keys(df: &DataFrame, offset_months: i32, dates: DateParsing) -> Result<Vec<Option<JoinKey>>> {
    let parsed = date_column(df, "date", dates)?;
    let skus = text_column(df, "sku")?;
    let geolocations = text_column(df, "geolocation")?;
    let warehouses = text_column(df, "warehouse")?;

    Ok(parsed
        .into_iter()
        .zip(skus)
        .zip(geolocations.into_iter().zip(warehouses))
        .map(|((date, sku), (geolocation, warehouse))| {
            Some(JoinKey {
                date: shift_months(date?, offset_months)?,
                sku: sku?,
                geolocation,
                warehouse,
            })
        })
        .collect())
}

/// Tabular form of [`align_with`] over frames in the internal schema.
///
/// Both frames need the join columns; the forecasts frame needs the measure
/// column and the actuals frame `actual_units`. Absent columns fail with
/// [`PlanningError::InvalidArgument`].
pub fn align_frames(
    forecasts: &DataFrame,
    actuals: &DataFrame,
    offset_months: i32,
    measure: ForecastMeasure,
    dates: DateParsing,
) -> Result<Vec<KpiRow>> {
    let mut forecast_columns = KEY_COLUMNS.to_vec();
    forecast_columns.push(measure.column());
    require_columns(forecasts, &forecast_columns)?;

    let mut actual_columns = KEY_COLUMNS.to_vec();
    actual_columns.push("actual_units");
    require_columns(actuals, &actual_columns)?;

    let forecast_keys = frame_keys(forecasts, offset_months, dates)?;
    let actual_keys = frame_keys(actuals, 0, dates)?;
    let forecast_values = float_column(forecasts, measure.column())?;
    let actual_values = float_column(actuals, "actual_units")?;

    let rows: Vec<KpiInput> = inner_join(&forecast_keys, &actual_keys)
        .into_iter()
        .filter_map(|(i, j)| {
            forecast_keys[i].as_ref().map(|key| KpiInput {
                date: key.date,
                actual: actual_values[j],
                forecast: forecast_values[i],
            })
        })
        .collect();

    Ok(aggregate_rows(&rows, KpiLevel::Monthly))
}
