//! # Planning Core
//!
//! Analytics for demand planning over sales and forecast data.
//!
//! ## Features
//!
//! - Forecast performance KPIs (absolute error, bias, accuracy) per month or year
//! - Lag-offset alignment of forecasts against actuals
//! - Monthly series preparation with gap filling
//! - ARIMA(p, d, q) statistical forecasts
//! - Z-score outlier detection
//!
//! Every operation is a synchronous, deterministic function over in-memory
//! data. Nothing here touches the file system or logs.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use planning_core::models::{forecast, ArimaOrder};
//! use planning_core::outliers::detect;
//! use planning_core::series::prepare_monthly;
//!
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let observations = (0..6).map(|i| (jan + chrono::Months::new(i), 100.0 + i as f64));
//! let series = prepare_monthly(observations)?;
//!
//! let report = detect(&series, 3.0)?;
//! assert_eq!(report.outliers().count(), 0);
//!
//! let result = forecast(&series, ArimaOrder::new(0, 1, 0), 3)?;
//! assert_eq!(result.values(), vec![105.0; 3]);
//! # Ok::<(), planning_core::PlanningError>(())
//! ```

pub mod data;
pub mod dates;
pub mod error;
pub mod kpi;
pub mod models;
pub mod offset;
pub mod outliers;
pub mod series;

// Re-export commonly used types
pub use crate::data::{ForecastRecord, SalesRecord};
pub use crate::dates::DateParsing;
pub use crate::error::{PlanningError, Result};
pub use crate::kpi::{aggregate, aggregate_rows, KpiInput, KpiLevel, KpiRow, Period};
pub use crate::models::{ArimaOrder, ForecastResult, SeriesForecaster};
pub use crate::offset::{align, align_with, ForecastMeasure};
pub use crate::outliers::{detect, OutlierReport};
pub use crate::series::{prepare_monthly, TimeSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
