//! Population statistics

use statrs::statistics::Statistics;

/// Mean and standard deviation of a sample treated as the whole population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Standard deviation with denominator N
    pub std_dev: f64,
}

impl PopulationStats {
    /// Compute population statistics. Empty input yields NaN for both fields.
    pub fn of(values: &[f64]) -> Self {
        Self {
            mean: values.iter().mean(),
            std_dev: values.iter().population_std_dev(),
        }
    }

    /// Whether z-scores are meaningful for this sample
    pub fn has_spread(&self) -> bool {
        self.std_dev.is_finite() && self.std_dev > 0.0
    }
}

/// True when every value equals the first one (vacuously true for empty input)
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}

/// Arithmetic mean that returns `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}
