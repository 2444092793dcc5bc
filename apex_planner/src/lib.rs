//! # Apex Planner
//!
//! Local demand-planning analysis over uploaded sales and forecasts.
//!
//! The [`Planner`] service ties a [`planning_store::PlanningStore`] to the
//! analytics in [`planning_core`]:
//!
//! - forecast performance KPIs with a lag offset
//! - ARIMA statistical forecasts per SKU
//! - z-score outlier detection per SKU
//!
//! Settings come from a YAML [`PlannerConfig`]; the `apex-planner` binary
//! exposes the same operations on the command line.

pub mod config;
pub mod error;
pub mod output;
pub mod service;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use output::OutputFormat;
pub use service::{PerformanceQuery, Planner};
