use chrono::NaiveDate;
use planning_core::DateParsing;
use planning_store::{
    GeographyRecord, PlanningStore, StoreConfig, StoreError, TableKind, WriteMode,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_upload(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn open_store(dir: &TempDir) -> PlanningStore {
    PlanningStore::open(StoreConfig::new(dir.path().join("data"))).unwrap()
}

#[test]
fn test_sales_uploads_accumulate() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let first = write_upload(
        dir.path(),
        "sales_q1.csv",
        "Date,SKU,Actual Units,GeoLocation,Warehouse\n\
         2024-01-01,A-1,100,DE,W1\n\
         2024-02-01,A-1,120,DE,W1\n",
    );
    let second = write_upload(
        dir.path(),
        "sales_q2.csv",
        "SKU,Date,Warehouse,GeoLocation,Actual Units\n\
         A-1,2024-04-01,W1,DE,90\n",
    );

    let summary = store.import(TableKind::Sales, &first, DateParsing::Strict).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.mode, WriteMode::Append);
    store.import(TableKind::Sales, &second, DateParsing::Strict).unwrap();

    let sales = store.sales(DateParsing::Strict).unwrap();
    let units: Vec<i64> = sales.iter().map(|s| s.actual_units).collect();
    assert_eq!(units, vec![100, 120, 90]);
    assert_eq!(sales[2].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    assert_eq!(sales[2].warehouse.as_deref(), Some("W1"));
}

#[test]
fn test_reference_tables_are_replaced() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let header = "GeoLocation,Warehouse,Aggregation1,Aggregation2,Aggregation3,Aggregation4,Aggregation5\n";

    let old = write_upload(
        dir.path(),
        "geo_old.csv",
        &format!("{}DE,W1,EU,,,,\nFR,W2,EU,,,,\n", header),
    );
    let new = write_upload(dir.path(), "geo_new.csv", &format!("{}US,W9,NA,East,,,\n", header));

    store.import(TableKind::Geography, &old, DateParsing::Lenient).unwrap();
    let summary = store.import(TableKind::Geography, &new, DateParsing::Lenient).unwrap();
    assert_eq!(summary.mode, WriteMode::Replace);

    assert_eq!(
        store.geography().unwrap(),
        vec![GeographyRecord {
            geolocation: Some("US".to_string()),
            warehouse: Some("W9".to_string()),
            agg1: Some("NA".to_string()),
            agg2: Some("East".to_string()),
            agg3: None,
            agg4: None,
            agg5: None,
        }]
    );
}

#[test]
fn test_product_master_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let upload = write_upload(
        dir.path(),
        "products.csv",
        "SKU,ABC,XYZ,BrandHierarchy1,BrandHierarchy2,BrandHierarchy3,BrandHierarchy4,BrandHierarchy5,\
         Production Site,Product Type,Sales Type,Product Status\n\
         A-1,A,X,Brand,Line,,,,Berlin,Finished,Stock,Active\n",
    );

    store.import(TableKind::ProductMaster, &upload, DateParsing::Lenient).unwrap();

    let products = store.products().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku, "A-1");
    assert_eq!(products[0].brand_h2.as_deref(), Some("Line"));
    assert_eq!(products[0].brand_h3, None);
    assert_eq!(products[0].production_site.as_deref(), Some("Berlin"));
}

#[test]
fn test_forecasts_preview() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let upload = write_upload(
        dir.path(),
        "forecasts.csv",
        "Version Date,Date,SKU,Forecast Units,Statistical Units,GeoLocation,Warehouse\n\
         2023-12-01,2024-01-01,A-1,110,,DE,W1\n\
         2023-12-01,2024-02-01,A-1,115,118,DE,W1\n\
         2023-12-01,2024-03-01,A-1,,95,DE,W1\n",
    );

    store.import(TableKind::Forecasts, &upload, DateParsing::Strict).unwrap();

    let preview = store.preview(TableKind::Forecasts, 2).unwrap();
    assert_eq!(preview.height(), 2);
    assert_eq!(preview.get_column_names(), TableKind::Forecasts.internal_columns());

    let forecasts = store.forecasts(DateParsing::Strict).unwrap();
    assert_eq!(forecasts.len(), 3);
    assert_eq!(forecasts[0].statistical_units, None);
    assert_eq!(forecasts[1].statistical_units, Some(118));
    assert_eq!(forecasts[2].forecast_units, None);
}

#[rstest]
#[case(TableKind::Sales, "Date,SKU\n2024-01-01,A\n")]
#[case(TableKind::Forecasts, "Date,SKU,Forecast Units\n2024-01-01,A,1\n")]
#[case(TableKind::Geography, "GeoLocation\nDE\n")]
fn test_invalid_upload_leaves_store_untouched(#[case] kind: TableKind, #[case] contents: &str) {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let upload = write_upload(dir.path(), "bad.csv", contents);

    let err = store.import(kind, &upload, DateParsing::Lenient).unwrap_err();
    assert!(matches!(err, StoreError::MissingColumns { .. }));
    assert_eq!(store.row_count(kind).unwrap(), 0);
    assert!(!store.table_path(kind).exists());
}

#[test]
fn test_lenient_import_drops_undated_sales() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let upload = write_upload(
        dir.path(),
        "sales.csv",
        "Date,SKU,Actual Units,GeoLocation,Warehouse\n\
         2024-01-01,A-1,100,DE,W1\n\
         soon,A-1,50,DE,W1\n",
    );

    let summary = store.import(TableKind::Sales, &upload, DateParsing::Lenient).unwrap();

    assert_eq!(summary.rows, 1);
    assert_eq!(store.row_count(TableKind::Sales).unwrap(), 1);
    assert_eq!(store.sales(DateParsing::Strict).unwrap().len(), 1);
}

#[rstest]
#[case::empty_units("2024-02-01,B-2,,DE,W1\n")]
#[case::text_units("2024-02-01,B-2,many,DE,W1\n")]
#[case::empty_sku("2024-02-01,,40,DE,W1\n")]
fn test_rejected_sales_rows_keep_table_readable(#[case] bad_row: &str) {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let header = "Date,SKU,Actual Units,GeoLocation,Warehouse\n";

    let good = write_upload(
        dir.path(),
        "sales_jan.csv",
        &format!("{}2024-01-01,A-1,100,DE,W1\n", header),
    );
    let bad = write_upload(
        dir.path(),
        "sales_feb.csv",
        &format!("{}2024-02-01,A-1,80,DE,W1\n{}", header, bad_row),
    );

    store.import(TableKind::Sales, &good, DateParsing::Strict).unwrap();
    let err = store.import(TableKind::Sales, &bad, DateParsing::Lenient).unwrap_err();
    assert!(matches!(err, StoreError::Planning(_)));

    let sales = store.sales(DateParsing::Strict).unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].actual_units, 100);
}

#[test]
fn test_rejected_forecast_rows_write_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let upload = write_upload(
        dir.path(),
        "forecasts.csv",
        "Version Date,Date,SKU,Forecast Units,Statistical Units,GeoLocation,Warehouse\n\
         2023-12-01,2024-01-01,A-1,110,,DE,W1\n\
         2023-12-01,2024-02-01,,115,118,DE,W1\n",
    );

    let err = store.import(TableKind::Forecasts, &upload, DateParsing::Strict).unwrap_err();
    assert!(matches!(err, StoreError::Planning(_)));
    assert!(!store.table_path(TableKind::Forecasts).exists());
    assert!(store.forecasts(DateParsing::Strict).unwrap().is_empty());
}

#[test]
fn test_replace_leaves_only_the_table_file() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let header = "GeoLocation,Warehouse,Aggregation1,Aggregation2,Aggregation3,Aggregation4,Aggregation5\n";

    for (name, row) in [("geo_1.csv", "DE,W1,EU,,,,\n"), ("geo_2.csv", "FR,W2,EU,,,,\n")] {
        let upload = write_upload(dir.path(), name, &format!("{}{}", header, row));
        store.import(TableKind::Geography, &upload, DateParsing::Lenient).unwrap();
    }

    let files: Vec<PathBuf> = fs::read_dir(store.data_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files, vec![store.table_path(TableKind::Geography)]);

    let geography = store.geography().unwrap();
    assert_eq!(geography.len(), 1);
    assert_eq!(geography[0].geolocation.as_deref(), Some("FR"));
}
