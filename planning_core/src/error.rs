//! Error types for the planning_core crate

use planning_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the analytics core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanningError {
    /// Unsupported option, missing column or unparseable value at the boundary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Empty or otherwise unusable series
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// The forecast model could not be fitted
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PlanningError>;

impl From<PolarsError> for PlanningError {
    fn from(err: PolarsError) -> Self {
        PlanningError::Polars(err.to_string())
    }
}

impl From<MathError> for PlanningError {
    fn from(err: MathError) -> Self {
        PlanningError::ModelFit(err.to_string())
    }
}
