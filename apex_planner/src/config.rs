//! Planner configuration loaded from YAML
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```yaml
//! data_dir: data
//! date_parsing: lenient
//! forecast:
//!   order: { p: 1, d: 1, q: 1 }
//!   horizon: 12
//! outliers:
//!   threshold: 3.0
//! performance:
//!   offset_months: 0
//!   measure: planner
//!   level: monthly
//! ```

use crate::error::{PlannerError, Result};
use planning_core::outliers::DEFAULT_THRESHOLD;
use planning_core::{ArimaOrder, DateParsing, ForecastMeasure, KpiLevel};
use planning_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub order: ArimaOrder,
    pub horizon: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            horizon: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierSettings {
    pub threshold: f64,
}

impl Default for OutlierSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub offset_months: i32,
    pub measure: ForecastMeasure,
    pub level: KpiLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub data_dir: PathBuf,
    pub date_parsing: DateParsing,
    pub forecast: ForecastSettings,
    pub outliers: OutlierSettings,
    pub performance: PerformanceSettings,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_dir: StoreConfig::default().data_dir,
            date_parsing: DateParsing::default(),
            forecast: ForecastSettings::default(),
            outliers: OutlierSettings::default(),
            performance: PerformanceSettings::default(),
        }
    }
}

impl PlannerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| PlannerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // An empty document deserializes as null rather than an empty map
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PlannerConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.forecast.horizon == 0 {
            return Err(PlannerError::Config(
                "forecast.horizon must be at least 1".to_string(),
            ));
        }
        if self.outliers.threshold.is_nan() || self.outliers.threshold < 0.0 {
            return Err(PlannerError::Config(format!(
                "outliers.threshold must be non-negative, got {}",
                self.outliers.threshold
            )));
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.data_dir.clone())
    }
}
