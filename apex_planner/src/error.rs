use planning_core::PlanningError;
use planning_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the planner service and command line
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("No data available: {0}")]
    NoData(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<serde_yaml::Error> for PlannerError {
    fn from(err: serde_yaml::Error) -> Self {
        PlannerError::Config(err.to_string())
    }
}

impl From<csv::Error> for PlannerError {
    fn from(err: csv::Error) -> Self {
        PlannerError::Output(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Output(err.to_string())
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::Output(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
