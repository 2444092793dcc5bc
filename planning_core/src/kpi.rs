//! Forecast performance KPIs
//!
//! Every row contributes an absolute error, a bias and an accuracy, and
//! rows are then grouped into monthly or yearly periods. Accuracy is
//! `1 - |forecast - actual| / actual` clamped to `[0, 1]`; a zero actual
//! leaves it undefined, and undefined accuracies are left out of the period
//! mean rather than counted as zero.

use crate::data::{date_column, float_column, require_columns};
use crate::dates::{month_start, DateParsing};
use crate::error::{PlanningError, Result};
use chrono::{Datelike, NaiveDate};
use planning_math::stats::mean;
use polars::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Aggregation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiLevel {
    /// Calendar month
    #[default]
    Monthly,
    /// Calendar year
    Ytd,
}

impl FromStr for KpiLevel {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "monthly" => Ok(KpiLevel::Monthly),
            "ytd" => Ok(KpiLevel::Ytd),
            other => Err(PlanningError::InvalidArgument(format!(
                "unsupported KPI level '{}', expected 'monthly' or 'ytd'",
                other
            ))),
        }
    }
}

/// Grouping key of a KPI row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    /// First day of a month
    Month(NaiveDate),
    /// Calendar year
    Year(i32),
}

impl Period {
    /// Period of `date` at the given level
    pub fn of(date: NaiveDate, level: KpiLevel) -> Self {
        match level {
            KpiLevel::Monthly => Period::Month(month_start(date)),
            KpiLevel::Ytd => Period::Year(date.year()),
        }
    }

    /// First calendar day covered by the period
    pub fn start_date(&self) -> NaiveDate {
        match *self {
            Period::Month(date) => date,
            Period::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Year(year) => write!(f, "{}", year),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row entering the aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiInput {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
}

impl KpiInput {
    pub fn new(date: NaiveDate, actual: f64, forecast: f64) -> Self {
        Self {
            date,
            actual: Some(actual),
            forecast: Some(forecast),
        }
    }

    /// `|forecast - actual|`, missing when either side is missing
    pub fn abs_error(&self) -> Option<f64> {
        self.bias().map(f64::abs)
    }

    /// `forecast - actual`, missing when either side is missing
    pub fn bias(&self) -> Option<f64> {
        Some(self.forecast? - self.actual?)
    }

    /// Accuracy clamped to `[0, 1]`; undefined for a zero or missing actual
    pub fn accuracy(&self) -> Option<f64> {
        let actual = self.actual.filter(|a| *a != 0.0)?;
        let ratio = self.abs_error()? / actual;
        if ratio.is_nan() {
            return None;
        }
        Some((1.0 - ratio).clamp(0.0, 1.0))
    }
}

/// Aggregated KPIs of one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub period: Period,
    pub actual_units: f64,
    pub forecast_units: f64,
    pub mean_abs_error: Option<f64>,
    pub mean_bias: Option<f64>,
    pub accuracy: Option<f64>,
}

#[derive(Default)]
struct PeriodAccumulator {
    actual: f64,
    forecast: f64,
    abs_errors: Vec<f64>,
    biases: Vec<f64>,
    accuracies: Vec<f64>,
}

impl PeriodAccumulator {
    fn push(&mut self, row: &KpiInput) {
        self.actual += row.actual.unwrap_or(0.0);
        self.forecast += row.forecast.unwrap_or(0.0);
        self.abs_errors.extend(row.abs_error());
        self.biases.extend(row.bias());
        self.accuracies.extend(row.accuracy());
    }

    fn finish(self, period: Period) -> KpiRow {
        KpiRow {
            period,
            actual_units: self.actual,
            forecast_units: self.forecast,
            mean_abs_error: mean(&self.abs_errors),
            mean_bias: mean(&self.biases),
            accuracy: mean(&self.accuracies),
        }
    }
}

/// Aggregate typed rows into one KPI row per period, ascending by period
pub fn aggregate_rows(rows: &[KpiInput], level: KpiLevel) -> Vec<KpiRow> {
    let mut periods: BTreeMap<Period, PeriodAccumulator> = BTreeMap::new();
    for row in rows {
        periods.entry(Period::of(row.date, level)).or_default().push(row);
    }

    periods
        .into_iter()
        .map(|(period, acc)| acc.finish(period))
        .collect()
}

/// Aggregate the rows of `df` using the named columns.
///
/// `level` is `"monthly"` or `"ytd"`. Missing columns and unsupported levels
/// fail with [`PlanningError::InvalidArgument`]; unparseable dates follow
/// `dates`.
pub fn aggregate(
    df: &DataFrame,
    actual_col: &str,
    forecast_col: &str,
    date_col: &str,
    level: &str,
    dates: DateParsing,
) -> Result<Vec<KpiRow>> {
    let level = level.parse::<KpiLevel>()?;
    require_columns(df, &[actual_col, forecast_col, date_col])?;

    let actuals = float_column(df, actual_col)?;
    let forecasts = float_column(df, forecast_col)?;
    let rows: Vec<KpiInput> = date_column(df, date_col, dates)?
        .into_iter()
        .zip(actuals.into_iter().zip(forecasts))
        .filter_map(|(date, (actual, forecast))| {
            date.map(|date| KpiInput {
                date,
                actual,
                forecast,
            })
        })
        .collect();

    Ok(aggregate_rows(&rows, level))
}

/// KPI rows as a frame with columns `period, actual_units, forecast_units,
/// mean_abs_error, mean_bias, accuracy`
pub fn kpi_frame(rows: &[KpiRow]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "period",
            rows.iter().map(|r| r.period.to_string()).collect::<Vec<_>>(),
        ),
        Series::new(
            "actual_units",
            rows.iter().map(|r| r.actual_units).collect::<Vec<_>>(),
        ),
        Series::new(
            "forecast_units",
            rows.iter().map(|r| r.forecast_units).collect::<Vec<_>>(),
        ),
        Series::new(
            "mean_abs_error",
            rows.iter().map(|r| r.mean_abs_error).collect::<Vec<_>>(),
        ),
        Series::new("mean_bias", rows.iter().map(|r| r.mean_bias).collect::<Vec<_>>()),
        Series::new("accuracy", rows.iter().map(|r| r.accuracy).collect::<Vec<_>>()),
    ])?;
    Ok(df)
}
