//! Statistical forecasting models for monthly series

use crate::error::Result;
use crate::series::TimeSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// One forecasted month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// First day of the forecasted month
    pub date: NaiveDate,
    /// Point forecast (mean of the predictive distribution)
    pub value: f64,
}

/// Parameters and fit statistics of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    /// Model name, e.g. `ARIMA(1,1,1)`
    pub name: String,
    /// Constant of the differenced series; zero when no constant is fitted
    pub intercept: f64,
    pub ar_coefficients: Vec<f64>,
    pub ma_coefficients: Vec<f64>,
    /// Maximum-likelihood innovation variance
    pub residual_variance: f64,
    /// Conditional Gaussian log-likelihood; `None` for a perfect fit
    pub log_likelihood: Option<f64>,
    /// Akaike information criterion; `None` for a perfect fit
    pub aic: Option<f64>,
    /// Observations used after dropping missing values
    pub observations: usize,
}

/// Forecast for consecutive future months
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForecastResult {
    /// One point per horizon step, starting the month after the input ends
    pub points: Vec<ForecastPoint>,
    /// Fitted model; `None` when there was too little data to fit
    pub model: Option<ModelSummary>,
}

impl ForecastResult {
    /// Result for a series too short to model
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

/// A model that turns a monthly series into a forecast.
///
/// Implementations are deterministic: the same series and horizon always
/// give the same result.
pub trait SeriesForecaster {
    /// Display name of the model
    fn name(&self) -> String;

    /// Forecast `horizon` months after the end of `series`.
    ///
    /// Too little data yields [`ForecastResult::empty`]; a model that cannot
    /// be fitted yields [`crate::PlanningError::ModelFit`].
    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ForecastResult>;
}

pub mod arima;

pub use arima::{forecast, ArimaModel, ArimaOrder};
