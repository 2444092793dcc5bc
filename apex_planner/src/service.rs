//! Analyses over the stored planning tables

use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use planning_core::kpi::aggregate_rows;
use planning_core::models::forecast;
use planning_core::offset::{join, AlignedRow};
use planning_core::outliers::detect;
use planning_core::series::sales_series;
use planning_core::{
    ArimaOrder, ForecastMeasure, ForecastRecord, ForecastResult, KpiInput, KpiLevel, KpiRow,
    OutlierReport, SalesRecord,
};
use planning_store::{ImportSummary, PlanningStore, TableKind};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{debug, info, warn};

/// Options of a performance run; unset fields fall back to the configuration
#[derive(Debug, Clone, Default)]
pub struct PerformanceQuery {
    pub sku: Option<String>,
    pub offset_months: Option<i32>,
    pub measure: Option<ForecastMeasure>,
    pub level: Option<KpiLevel>,
}

/// Demand-planning service bound to one store
pub struct Planner {
    store: PlanningStore,
    config: PlannerConfig,
}

impl Planner {
    /// Open the store named by `config`
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let store = PlanningStore::open(config.store_config())?;
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: PlanningStore, config: PlannerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &PlanningStore {
        &self.store
    }

    pub fn import(&self, kind: TableKind, path: &Path) -> Result<ImportSummary> {
        Ok(self.store.import(kind, path, self.config.date_parsing)?)
    }

    pub fn preview(&self, kind: TableKind, limit: usize) -> Result<DataFrame> {
        Ok(self.store.preview(kind, limit)?)
    }

    fn sales_for(&self, sku: Option<&str>) -> Result<Vec<SalesRecord>> {
        let sales: Vec<SalesRecord> = self
            .store
            .sales(self.config.date_parsing)?
            .into_iter()
            .filter(|r| sku.map_or(true, |s| r.sku == s))
            .collect();
        debug!(rows = sales.len(), sku = ?sku, "loaded sales");
        Ok(sales)
    }

    fn forecasts_for(&self, sku: Option<&str>) -> Result<Vec<ForecastRecord>> {
        let forecasts: Vec<ForecastRecord> = self
            .store
            .forecasts(self.config.date_parsing)?
            .into_iter()
            .filter(|r| sku.map_or(true, |s| r.sku == s))
            .collect();
        debug!(rows = forecasts.len(), sku = ?sku, "loaded forecasts");
        Ok(forecasts)
    }

    /// Forecast accuracy KPIs with forecasts shifted by the offset.
    ///
    /// Fails with [`PlannerError::NoData`] when either table has no rows for
    /// the SKU filter.
    pub fn performance(&self, query: &PerformanceQuery) -> Result<Vec<KpiRow>> {
        let defaults = &self.config.performance;
        let offset = query.offset_months.unwrap_or(defaults.offset_months);
        let measure = query.measure.unwrap_or(defaults.measure);
        let level = query.level.unwrap_or(defaults.level);
        let sku = query.sku.as_deref();

        let sales = self.sales_for(sku)?;
        let forecasts = self.forecasts_for(sku)?;
        if sales.is_empty() || forecasts.is_empty() {
            warn!(sku = ?sku, "performance requested without sales or forecasts");
            return Err(PlannerError::NoData(
                "upload sales and forecasts first".to_string(),
            ));
        }

        let inputs: Vec<KpiInput> = join(&forecasts, &sales, offset, measure)
            .iter()
            .map(AlignedRow::kpi_input)
            .collect();
        let kpis = aggregate_rows(&inputs, level);
        info!(
            offset,
            measure = measure.column(),
            matched = inputs.len(),
            periods = kpis.len(),
            "computed forecast performance"
        );
        Ok(kpis)
    }

    /// Statistical forecast of the monthly sales totals
    pub fn statistical_forecast(
        &self,
        sku: Option<&str>,
        horizon: Option<usize>,
        order: Option<ArimaOrder>,
    ) -> Result<ForecastResult> {
        let horizon = horizon.unwrap_or(self.config.forecast.horizon);
        let order = order.unwrap_or(self.config.forecast.order);

        let sales = self.sales_for(sku)?;
        if sales.is_empty() {
            return Err(PlannerError::NoData("no sales data available".to_string()));
        }

        let series = sales_series(&sales, sku)?;
        let result = forecast(&series, order, horizon)?;
        if result.is_empty() {
            warn!(
                observations = series.len(),
                "too few observations for a statistical forecast"
            );
        } else {
            info!(%order, horizon, observations = series.len(), "generated statistical forecast");
        }
        Ok(result)
    }

    /// Z-score outliers of the monthly sales totals
    pub fn outliers(&self, sku: Option<&str>, threshold: Option<f64>) -> Result<OutlierReport> {
        let threshold = threshold.unwrap_or(self.config.outliers.threshold);

        let sales = self.sales_for(sku)?;
        if sales.is_empty() {
            return Err(PlannerError::NoData("no sales data available".to_string()));
        }

        let series = sales_series(&sales, sku)?;
        let report = detect(&series, threshold)?;
        info!(
            threshold,
            points = report.len(),
            flagged = report.outliers().count(),
            "detected outliers"
        );
        Ok(report)
    }
}
