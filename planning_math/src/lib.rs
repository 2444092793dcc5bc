//! # Planning Math
//!
//! Numeric building blocks shared by the demand-planning analytics:
//! a bounded Nelder-Mead minimiser, ARIMA differencing helpers and
//! population statistics.

use thiserror::Error;

pub mod diff;
pub mod optimization;
pub mod stats;

/// Errors that can occur in numeric helpers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric helpers
pub type Result<T> = std::result::Result<T, MathError>;
