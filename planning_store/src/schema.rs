//! Upload schemas of the four planning tables

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The tables a planner can upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Sales,
    ProductMaster,
    Forecasts,
    Geography,
}

/// How an upload is combined with what is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Replace,
}

const SALES: &[(&str, &str)] = &[
    ("Date", "date"),
    ("SKU", "sku"),
    ("Actual Units", "actual_units"),
    ("GeoLocation", "geolocation"),
    ("Warehouse", "warehouse"),
];

const PRODUCT_MASTER: &[(&str, &str)] = &[
    ("SKU", "sku"),
    ("ABC", "abc"),
    ("XYZ", "xyz"),
    ("BrandHierarchy1", "brand_h1"),
    ("BrandHierarchy2", "brand_h2"),
    ("BrandHierarchy3", "brand_h3"),
    ("BrandHierarchy4", "brand_h4"),
    ("BrandHierarchy5", "brand_h5"),
    ("Production Site", "production_site"),
    ("Product Type", "product_type"),
    ("Sales Type", "sales_type"),
    ("Product Status", "product_status"),
];

const FORECASTS: &[(&str, &str)] = &[
    ("Version Date", "version_date"),
    ("Date", "date"),
    ("SKU", "sku"),
    ("Forecast Units", "forecast_units"),
    ("Statistical Units", "statistical_units"),
    ("GeoLocation", "geolocation"),
    ("Warehouse", "warehouse"),
];

const GEOGRAPHY: &[(&str, &str)] = &[
    ("GeoLocation", "geolocation"),
    ("Warehouse", "warehouse"),
    ("Aggregation1", "agg1"),
    ("Aggregation2", "agg2"),
    ("Aggregation3", "agg3"),
    ("Aggregation4", "agg4"),
    ("Aggregation5", "agg5"),
];

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Sales,
        TableKind::ProductMaster,
        TableKind::Forecasts,
        TableKind::Geography,
    ];

    /// Internal table name, also the stem of its file on disk
    pub fn key(&self) -> &'static str {
        match self {
            TableKind::Sales => "sales",
            TableKind::ProductMaster => "product_master",
            TableKind::Forecasts => "forecasts",
            TableKind::Geography => "geography",
        }
    }

    /// Pairs of (upload header, internal column) in table order
    pub fn renames(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            TableKind::Sales => SALES,
            TableKind::ProductMaster => PRODUCT_MASTER,
            TableKind::Forecasts => FORECASTS,
            TableKind::Geography => GEOGRAPHY,
        }
    }

    /// Headers an upload file must carry
    pub fn external_columns(&self) -> Vec<&'static str> {
        self.renames().iter().map(|(external, _)| *external).collect()
    }

    /// Column names as stored
    pub fn internal_columns(&self) -> Vec<&'static str> {
        self.renames().iter().map(|(_, internal)| *internal).collect()
    }

    /// Columns holding calendar dates
    pub fn date_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Sales => &["date"],
            TableKind::Forecasts => &["version_date", "date"],
            TableKind::ProductMaster | TableKind::Geography => &[],
        }
    }

    /// Transactional tables accumulate; reference tables are overwritten
    pub fn write_mode(&self) -> WriteMode {
        match self {
            TableKind::Sales | TableKind::Forecasts => WriteMode::Append,
            TableKind::ProductMaster | TableKind::Geography => WriteMode::Replace,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TableKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.key() == normalized)
            .ok_or_else(|| StoreError::UnknownTable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sales", TableKind::Sales)]
    #[case("product-master", TableKind::ProductMaster)]
    #[case("Product Master", TableKind::ProductMaster)]
    #[case("FORECASTS", TableKind::Forecasts)]
    #[case("geography", TableKind::Geography)]
    fn test_parse_table_kind(#[case] raw: &str, #[case] expected: TableKind) {
        assert_eq!(raw.parse::<TableKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_table() {
        let err = "inventory".parse::<TableKind>().unwrap_err();
        assert!(matches!(err, StoreError::UnknownTable(name) if name == "inventory"));
    }

    #[test]
    fn test_internal_columns_follow_core_schemas() {
        assert_eq!(
            TableKind::Sales.internal_columns(),
            planning_core::data::SALES_COLUMNS.to_vec()
        );
        assert_eq!(
            TableKind::Forecasts.internal_columns(),
            planning_core::data::FORECAST_COLUMNS.to_vec()
        );
    }

    #[test]
    fn test_write_modes() {
        assert_eq!(TableKind::Sales.write_mode(), WriteMode::Append);
        assert_eq!(TableKind::Forecasts.write_mode(), WriteMode::Append);
        assert_eq!(TableKind::ProductMaster.write_mode(), WriteMode::Replace);
        assert_eq!(TableKind::Geography.write_mode(), WriteMode::Replace);
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            TableKind::Sales.external_columns(),
            vec!["Date", "SKU", "Actual Units", "GeoLocation", "Warehouse"]
        );
        assert_eq!(TableKind::ProductMaster.external_columns().len(), 12);
        assert_eq!(TableKind::Geography.internal_columns()[6], "agg5");
    }
}
