//! # Apex Planner Workspace
//!
//! Umbrella crate re-exporting the demand-planning workspace members.
//!
//! ## Example
//!
//! ```
//! use apex_planner_workspace::analytics::{KpiInput, KpiLevel, aggregate_rows};
//! use chrono::NaiveDate;
//!
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let rows = aggregate_rows(&[KpiInput::new(jan, 100.0, 80.0)], KpiLevel::Monthly);
//! assert_eq!(rows[0].accuracy, Some(0.8));
//! ```

/// Analytics: KPIs, offset alignment, series preparation, ARIMA, outliers
pub use planning_core as analytics;

/// Numeric helpers
pub use planning_math as math;

/// CSV ingestion and table storage
pub use planning_store as store;

/// Planner service, configuration and output
pub use apex_planner as app;

/// Versions of the member crates, as `(name, version)` pairs.
pub fn versions() -> Vec<(&'static str, &'static str)> {
    vec![
        (planning_core::NAME, planning_core::VERSION),
        ("apex_planner_workspace", env!("CARGO_PKG_VERSION")),
    ]
}
