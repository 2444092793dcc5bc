//! Z-score outlier detection

use crate::error::{PlanningError, Result};
use crate::series::TimeSeries;
use chrono::NaiveDate;
use planning_math::stats::{is_constant, PopulationStats};
use serde::Serialize;

/// Default |z| at which a point is flagged
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Standardised deviation of one series point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub z_score: f64,
    pub is_outlier: bool,
}

/// One entry per input point, in input order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OutlierReport {
    pub points: Vec<OutlierPoint>,
}

impl OutlierReport {
    /// Points flagged as outliers
    pub fn outliers(&self) -> impl Iterator<Item = &OutlierPoint> {
        self.points.iter().filter(|p| p.is_outlier)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Flag points whose population z-score reaches `threshold` in magnitude.
///
/// When the series has no spread (constant values, or a NaN that poisons the
/// statistics) every z-score is 0 and nothing is flagged.
pub fn detect(series: &TimeSeries, threshold: f64) -> Result<OutlierReport> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(PlanningError::InvalidArgument(format!(
            "outlier threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let values = series.values();
    let stats = PopulationStats::of(&values);
    let flat = !stats.has_spread() || is_constant(&values);

    let points = series
        .points()
        .iter()
        .map(|p| {
            let z_score = if flat {
                0.0
            } else {
                (p.value - stats.mean) / stats.std_dev
            };
            OutlierPoint {
                date: p.date,
                value: p.value,
                z_score,
                is_outlier: !flat && z_score.abs() >= threshold,
            }
        })
        .collect();

    Ok(OutlierReport { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::from_values(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn test_flags_spike_at_inclusive_threshold() {
        let report = detect(&series(&[10.0, 10.0, 10.0, 10.0, 100.0]), 2.0).unwrap();

        let flags: Vec<bool> = report.points.iter().map(|p| p.is_outlier).collect();
        assert_eq!(flags, vec![false, false, false, false, true]);
        assert_abs_diff_eq!(report.points[4].z_score, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.points[0].z_score, -0.5, epsilon = 1e-12);
        assert_eq!(report.outliers().count(), 1);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(3.0)]
    fn test_constant_series_has_no_outliers(#[case] threshold: f64) {
        let report = detect(&series(&[0.1, 0.1, 0.1, 0.1]), threshold).unwrap();
        assert!(report.points.iter().all(|p| p.z_score == 0.0 && !p.is_outlier));
    }

    #[test]
    fn test_nan_input_yields_zero_scores() {
        let report = detect(&series(&[1.0, f64::NAN, 3.0]), 1.0).unwrap();
        assert!(report.points.iter().all(|p| p.z_score == 0.0 && !p.is_outlier));
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_preserves_order_and_values() {
        let values = [3.0, 1.0, 2.0];
        let report = detect(&series(&values), DEFAULT_THRESHOLD).unwrap();
        let returned: Vec<f64> = report.points.iter().map(|p| p.value).collect();
        assert_eq!(returned, values.to_vec());
    }

    #[test]
    fn test_empty_series() {
        let report = detect(&TimeSeries::default(), DEFAULT_THRESHOLD).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        assert!(detect(&series(&[1.0, 2.0]), -1.0).is_err());
        assert!(detect(&series(&[1.0, 2.0]), f64::NAN).is_err());
    }
}
