//! Monthly time series preparation
//!
//! Raw observations arrive unordered and possibly with months missing. The
//! analytics that consume them (forecasting and outlier detection) expect a
//! regular monthly series with one point per calendar month, so gaps are
//! filled with zero demand.

use crate::data::SalesRecord;
use crate::dates::{month_start, months_after};
use crate::error::{PlanningError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One monthly observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// First day of the month
    pub date: NaiveDate,
    pub value: f64,
}

/// Regular monthly series: strictly increasing month starts with no gaps
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Series of consecutive months starting at the month containing `start`
    pub fn from_values(start: NaiveDate, values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                months_after(start, i as u32)
                    .map(|date| SeriesPoint { date, value })
                    .ok_or_else(|| {
                        PlanningError::InvalidSeries("series runs past the supported date range".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Turn `(date, value)` observations for one entity into a monthly series.
///
/// Dates are normalised to the first of their month and the result spans the
/// first to the last observed month, with unobserved months set to 0.
///
/// Precondition: at most one observation per month. Observations are not
/// summed here; a second observation for a month fails with
/// [`PlanningError::InvalidSeries`]. Use [`monthly_totals`] first when the
/// raw rows can repeat a month. Empty input also fails.
pub fn prepare_monthly<I>(observations: I) -> Result<TimeSeries>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut by_month = BTreeMap::new();
    for (date, value) in observations {
        let month = month_start(date);
        if by_month.insert(month, value).is_some() {
            return Err(PlanningError::InvalidSeries(format!(
                "more than one observation for month {}; aggregate per month first",
                month
            )));
        }
    }

    let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back()) else {
        return Err(PlanningError::InvalidSeries("no observations to prepare".to_string()));
    };

    let mut points = Vec::new();
    let mut month = first;
    while month <= last {
        points.push(SeriesPoint {
            date: month,
            value: by_month.get(&month).copied().unwrap_or(0.0),
        });
        month = months_after(month, 1).ok_or_else(|| {
            PlanningError::InvalidSeries("series runs past the supported date range".to_string())
        })?;
    }

    Ok(TimeSeries { points })
}

/// Sum observations per calendar month, ordered by month
pub fn monthly_totals<I>(observations: I) -> Vec<(NaiveDate, f64)>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in observations {
        *totals.entry(month_start(date)).or_insert(0.0) += value;
    }
    totals.into_iter().collect()
}

/// Monthly series of actual units, summed over locations.
///
/// `sku` restricts the series to one product; `None` uses every record.
pub fn sales_series(records: &[SalesRecord], sku: Option<&str>) -> Result<TimeSeries> {
    let observations = records
        .iter()
        .filter(|r| sku.map_or(true, |s| r.sku == s))
        .map(|r| (r.date, r.actual_units as f64));
    prepare_monthly(monthly_totals(observations))
}
