//! Differencing and integration for ARIMA models

/// Difference a series `d` times.
///
/// Each pass shortens the series by one. Differencing a series that is
/// already down to a single point yields an empty series.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// `differenced` holds future values on the differenced scale; the anchor for
/// each level is the last value of `original` differenced to that level.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || differenced.is_empty() {
        return differenced.to_vec();
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        let mut running = anchor;
        result = result
            .iter()
            .map(|step| {
                running += step;
                running
            })
            .collect();
    }

    result
}
