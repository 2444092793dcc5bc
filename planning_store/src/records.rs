//! Reference-table records

use serde::{Deserialize, Serialize};

/// Product master data for one SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub abc: Option<String>,
    pub xyz: Option<String>,
    pub brand_h1: Option<String>,
    pub brand_h2: Option<String>,
    pub brand_h3: Option<String>,
    pub brand_h4: Option<String>,
    pub brand_h5: Option<String>,
    pub production_site: Option<String>,
    pub product_type: Option<String>,
    pub sales_type: Option<String>,
    pub product_status: Option<String>,
}

/// Aggregation levels of one location/warehouse pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyRecord {
    pub geolocation: Option<String>,
    pub warehouse: Option<String>,
    pub agg1: Option<String>,
    pub agg2: Option<String>,
    pub agg3: Option<String>,
    pub agg4: Option<String>,
    pub agg5: Option<String>,
}
