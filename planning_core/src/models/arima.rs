//! ARIMA models for monthly demand forecasting
//!
//! Parameters are estimated by conditional maximum likelihood: with the
//! innovation variance concentrated out, maximising the Gaussian likelihood
//! is the same as minimising the conditional sum of squared one-step errors,
//! which is done with a deterministic Nelder-Mead search. A constant is only
//! fitted when the series is not differenced.

use crate::dates::months_after;
use crate::error::{PlanningError, Result};
use crate::models::{ForecastPoint, ForecastResult, ModelSummary, SeriesForecaster};
use crate::series::TimeSeries;
use planning_math::diff::{difference, integrate};
use planning_math::optimization::{nelder_mead, NelderMeadConfig};
use planning_math::stats::{is_constant, mean};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fewest non-missing observations a forecast is attempted on
pub const MIN_OBSERVATIONS: usize = 3;

/// Bound on each AR and MA coefficient during estimation
const COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = PlanningError;

    /// Parses `p,d,q`, optionally wrapped in parentheses
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            PlanningError::InvalidArgument(format!(
                "invalid ARIMA order '{}', expected three integers like 1,1,1",
                s
            ))
        };

        let parts = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(|part| part.trim().parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [p, d, q] => Ok(Self::new(*p, *d, *q)),
            _ => Err(invalid()),
        }
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    order: ArimaOrder,
    optimizer: NelderMeadConfig,
}

/// ARIMA model fitted to a series
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    order: ArimaOrder,
    intercept: f64,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    /// Observations the model was fitted on
    history: Vec<f64>,
    /// `history` differenced `d` times
    differenced: Vec<f64>,
    /// One-step errors on the differenced scale
    residuals: Vec<f64>,
    residual_variance: f64,
}

/// Position of each parameter in the optimiser's vector
#[derive(Debug, Clone, Copy)]
struct ParamLayout {
    with_intercept: bool,
    p: usize,
    q: usize,
}

impl ParamLayout {
    fn len(&self) -> usize {
        usize::from(self.with_intercept) + self.p + self.q
    }

    fn split<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64]) {
        let offset = usize::from(self.with_intercept);
        let intercept = if self.with_intercept { params[0] } else { 0.0 };
        let ar = &params[offset..offset + self.p];
        let ma = &params[offset + self.p..offset + self.p + self.q];
        (intercept, ar, ma)
    }

    fn initial(&self, series: &[f64]) -> Vec<f64> {
        let mut start = Vec::with_capacity(self.len());
        if self.with_intercept {
            start.push(mean(series).unwrap_or(0.0));
        }
        start.extend((0..self.p).map(|i| 0.1 / (i + 1) as f64));
        start.extend((0..self.q).map(|i| 0.1 / (i + 1) as f64));
        start
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        let mut bounds = Vec::with_capacity(self.len());
        if self.with_intercept {
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        bounds.extend(
            std::iter::repeat((-COEFFICIENT_BOUND, COEFFICIENT_BOUND)).take(self.p + self.q),
        );
        bounds
    }
}

/// One-step errors of an ARMA model on `series`; the first `p` are zero
fn conditional_residuals(series: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; series.len()];

    for t in p..series.len() {
        let mut prediction = intercept;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * (series[t - 1 - i] - intercept);
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                prediction += theta * residuals[t - 1 - j];
            }
        }
        residuals[t] = series[t] - prediction;
    }

    residuals
}

fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|e| e * e).sum()
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::with_order(ArimaOrder::new(p, d, q))
    }

    pub fn with_order(order: ArimaOrder) -> Self {
        Self {
            name: format!("ARIMA{}", order),
            order,
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Replace the optimiser settings
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fit the model to observations without missing values
    pub fn train(&self, values: &[f64]) -> Result<TrainedArimaModel> {
        let ArimaOrder { p, d, q } = self.order;
        let differenced = difference(values, d);

        if differenced.len() <= p {
            return Err(PlanningError::ModelFit(format!(
                "{} needs more than {} observations after differencing, got {}",
                self.name,
                p,
                differenced.len()
            )));
        }

        let layout = ParamLayout {
            with_intercept: d == 0,
            p,
            q,
        };

        let (intercept, ar_coefficients, ma_coefficients) = if p + q == 0 {
            let intercept = if layout.with_intercept {
                mean(&differenced).unwrap_or(0.0)
            } else {
                0.0
            };
            (intercept, Vec::new(), Vec::new())
        } else {
            if is_constant(&differenced) {
                return Err(PlanningError::ModelFit(format!(
                    "{}: series is constant after differencing",
                    self.name
                )));
            }

            let bounds = layout.bounds();
            let fit = nelder_mead(
                |params| {
                    let (intercept, ar, ma) = layout.split(params);
                    sum_of_squares(&conditional_residuals(&differenced, intercept, ar, ma)[p..])
                },
                &layout.initial(&differenced),
                Some(&bounds),
                &self.optimizer,
            )?;

            if !fit.converged {
                return Err(PlanningError::ModelFit(format!(
                    "{}: optimizer did not converge after {} iterations",
                    self.name, fit.iterations
                )));
            }
            if !fit.value.is_finite() {
                return Err(PlanningError::ModelFit(format!(
                    "{}: likelihood is not finite",
                    self.name
                )));
            }

            let (intercept, ar, ma) = layout.split(&fit.point);
            (intercept, ar.to_vec(), ma.to_vec())
        };

        let residuals = conditional_residuals(&differenced, intercept, &ar_coefficients, &ma_coefficients);
        let residual_variance = sum_of_squares(&residuals[p..]) / (differenced.len() - p) as f64;
        if !residual_variance.is_finite() {
            return Err(PlanningError::ModelFit(format!(
                "{}: residual variance is not finite",
                self.name
            )));
        }

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            order: self.order,
            intercept,
            ar_coefficients,
            ma_coefficients,
            history: values.to_vec(),
            differenced,
            residuals,
            residual_variance,
        })
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::with_order(ArimaOrder::default())
    }
}

impl TrainedArimaModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Point forecasts for the next `horizon` steps on the original scale
    pub fn forecast_values(&self, horizon: usize) -> Vec<f64> {
        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut residuals = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut prediction = self.intercept;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                prediction += phi * (extended[t - 1 - i] - self.intercept);
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                if t > j {
                    prediction += theta * residuals[t - 1 - j];
                }
            }
            extended.push(prediction);
            // Future shocks have zero mean
            residuals.push(0.0);
        }

        integrate(&extended[n..], &self.history, self.order.d)
    }

    /// Parameters and fit statistics
    pub fn summary(&self) -> ModelSummary {
        let effective = (self.differenced.len() - self.order.p) as f64;
        let parameters = usize::from(self.order.d == 0) + self.order.p + self.order.q + 1;
        let log_likelihood = (self.residual_variance > 0.0).then(|| {
            -0.5 * effective
                * ((2.0 * std::f64::consts::PI * self.residual_variance).ln() + 1.0)
        });

        ModelSummary {
            name: self.name.clone(),
            intercept: self.intercept,
            ar_coefficients: self.ar_coefficients.clone(),
            ma_coefficients: self.ma_coefficients.clone(),
            residual_variance: self.residual_variance,
            log_likelihood,
            aic: log_likelihood.map(|ll| -2.0 * ll + 2.0 * parameters as f64),
            observations: self.history.len(),
        }
    }
}

impl SeriesForecaster for ArimaModel {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ForecastResult> {
        let observed: Vec<_> = series
            .points()
            .iter()
            .filter(|p| p.value.is_finite())
            .collect();

        let Some(last) = observed.last().map(|p| p.date) else {
            return Ok(ForecastResult::empty());
        };
        if observed.len() < MIN_OBSERVATIONS {
            return Ok(ForecastResult::empty());
        }

        let values: Vec<f64> = observed.iter().map(|p| p.value).collect();
        let trained = self.train(&values)?;

        let points = trained
            .forecast_values(horizon)
            .into_iter()
            .enumerate()
            .map(|(step, value)| {
                months_after(last, step as u32 + 1)
                    .map(|date| ForecastPoint { date, value })
                    .ok_or_else(|| {
                        PlanningError::InvalidSeries(
                            "forecast horizon runs past the supported date range".to_string(),
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForecastResult {
            points,
            model: Some(trained.summary()),
        })
    }
}

/// Fit ARIMA(`order`) to `series` and forecast `horizon` months.
///
/// Missing (non-finite) values are dropped first. Fewer than three remaining
/// observations give an empty result; a model that cannot be fitted gives
/// [`PlanningError::ModelFit`].
pub fn forecast(series: &TimeSeries, order: ArimaOrder, horizon: usize) -> Result<ForecastResult> {
    ArimaModel::with_order(order).forecast(series, horizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::from_values(ymd(2023, 1, 1), values).unwrap()
    }

    #[rstest]
    #[case("1,1,1", ArimaOrder::new(1, 1, 1))]
    #[case("(2, 0, 1)", ArimaOrder::new(2, 0, 1))]
    fn test_order_from_str(#[case] raw: &str, #[case] expected: ArimaOrder) {
        assert_eq!(raw.parse::<ArimaOrder>().unwrap(), expected);
    }

    #[rstest]
    #[case("1,1")]
    #[case("a,b,c")]
    #[case("1,-1,0")]
    fn test_order_from_str_rejects(#[case] raw: &str) {
        assert!(raw.parse::<ArimaOrder>().is_err());
    }

    #[test]
    fn test_two_points_give_empty_result() {
        let result = forecast(&series(&[10.0, 12.0]), ArimaOrder::default(), 6).unwrap();
        assert!(result.is_empty());
        assert!(result.model.is_none());
    }

    #[test]
    fn test_missing_values_are_dropped_before_counting() {
        let result = forecast(&series(&[10.0, f64::NAN, 12.0]), ArimaOrder::new(0, 0, 0), 3).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_constant_mean_model() {
        let result = forecast(&series(&[5.0, 5.0, 5.0]), ArimaOrder::new(0, 0, 0), 4).unwrap();
        assert_eq!(result.values(), vec![5.0; 4]);
        assert_eq!(
            result.dates(),
            vec![ymd(2023, 4, 1), ymd(2023, 5, 1), ymd(2023, 6, 1), ymd(2023, 7, 1)]
        );
    }

    #[test]
    fn test_random_walk_repeats_last_value() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let result = forecast(&series(&values), ArimaOrder::new(0, 1, 0), 3).unwrap();
        assert_eq!(result.values(), vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_double_differencing_extends_trend() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let result = forecast(&series(&values), ArimaOrder::new(0, 2, 0), 3).unwrap();
        assert_eq!(result.values(), vec![11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_constant_after_differencing_is_a_fit_error() {
        let err = forecast(&series(&[7.0; 12]), ArimaOrder::new(1, 1, 1), 3).unwrap_err();
        assert!(matches!(err, PlanningError::ModelFit(_)));
    }

    #[test]
    fn test_too_few_points_after_differencing() {
        let err = forecast(&series(&[1.0, 4.0, 2.0]), ArimaOrder::new(2, 1, 0), 3).unwrap_err();
        assert!(matches!(err, PlanningError::ModelFit(_)));
    }

    #[test]
    fn test_horizon_zero() {
        let result = forecast(&series(&[1.0, 2.0, 3.0]), ArimaOrder::new(0, 0, 0), 0).unwrap();
        assert!(result.is_empty());
        assert!(result.model.is_some());
    }

    #[test]
    fn test_dates_continue_after_missing_tail() {
        let result = forecast(&series(&[1.0, 2.0, 3.0, f64::NAN]), ArimaOrder::new(0, 0, 0), 1).unwrap();
        assert_eq!(result.dates(), vec![ymd(2023, 4, 1)]);
        assert_abs_diff_eq!(result.values()[0], 2.0, epsilon = 1e-12);
    }
}
