//! # Planning Store
//!
//! `planning_store` ingests the CSV uploads of a demand-planning team and keeps
//! them as local tables.
//!
//! ## Tables
//!
//! - **Sales**: observed units per month, SKU and location (appended)
//! - **Forecasts**: versioned planner and statistical forecasts (appended)
//! - **Product master**: SKU classification and hierarchy (replaced)
//! - **Geography**: location aggregation levels (replaced)
//!
//! ## Usage Example
//!
//! ```no_run
//! use planning_store::{PlanningStore, StoreConfig, TableKind};
//! use planning_core::DateParsing;
//!
//! let store = PlanningStore::open(StoreConfig::new("data")).unwrap();
//! store.import(TableKind::Sales, "uploads/sales.csv", DateParsing::Lenient).unwrap();
//!
//! let sales = store.sales(DateParsing::Lenient).unwrap();
//! println!("{} sales rows stored", sales.len());
//! ```

pub mod error;
pub mod ingest;
pub mod records;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use ingest::{read_upload, validate_columns};
pub use records::{GeographyRecord, ProductRecord};
pub use schema::{TableKind, WriteMode};
pub use store::{ImportSummary, PlanningStore, StoreConfig};
