//! Error types for ingestion and storage

use planning_core::PlanningError;
use thiserror::Error;

/// Errors raised while validating, importing or reading stored tables
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Missing columns in {table}: {}", .missing.join(", "))]
    MissingColumns { table: String, missing: Vec<String> },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(String),

    #[error(transparent)]
    Planning(#[from] PlanningError),
}

impl From<polars::prelude::PolarsError> for StoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        StoreError::Polars(err.to_string())
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
