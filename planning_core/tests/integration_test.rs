use chrono::NaiveDate;
use planning_core::data::{forecasts_frame, sales_frame};
use planning_core::kpi::kpi_frame;
use planning_core::models::{forecast, ArimaOrder};
use planning_core::offset::align_frames;
use planning_core::outliers::detect;
use planning_core::series::sales_series;
use planning_core::{
    align, DateParsing, ForecastMeasure, ForecastRecord, Period, PlanningError, SalesRecord,
};
use pretty_assertions::assert_eq;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Helper function to create a small planning dataset for one SKU in two warehouses
fn create_sample_data() -> (Vec<SalesRecord>, Vec<ForecastRecord>) {
    let monthly = [100, 120, 90, 110, 130, 95, 105, 115, 500, 100, 120, 110];
    let mut sales = Vec::new();
    let mut forecasts = Vec::new();

    for (i, &units) in monthly.iter().enumerate() {
        let date = ymd(2024, i as u32 + 1, 1);
        for warehouse in ["W1", "W2"] {
            sales.push(SalesRecord {
                date,
                sku: "SKU-1".to_string(),
                actual_units: units,
                geolocation: Some("DE".to_string()),
                warehouse: Some(warehouse.to_string()),
            });
            forecasts.push(ForecastRecord {
                version_date: ymd(2023, 12, 1),
                date,
                sku: "SKU-1".to_string(),
                forecast_units: Some(110),
                statistical_units: Some(units),
                geolocation: Some("DE".to_string()),
                warehouse: Some(warehouse.to_string()),
            });
        }
    }

    (sales, forecasts)
}

#[test]
fn test_performance_example_scenario() {
    let months = [(1, 100), (2, 120), (3, 90)];
    let sales: Vec<SalesRecord> = months
        .iter()
        .map(|&(m, units)| SalesRecord {
            date: ymd(2024, m, 1),
            sku: "A".to_string(),
            actual_units: units,
            geolocation: Some("DE".to_string()),
            warehouse: Some("W1".to_string()),
        })
        .collect();
    let forecasts: Vec<ForecastRecord> = sales
        .iter()
        .map(|s| ForecastRecord {
            version_date: ymd(2023, 12, 1),
            date: s.date,
            sku: s.sku.clone(),
            forecast_units: Some(s.actual_units),
            statistical_units: None,
            geolocation: s.geolocation.clone(),
            warehouse: s.warehouse.clone(),
        })
        .collect();

    let kpis = align(&forecasts, &sales, 0);

    assert_eq!(
        kpis.iter().map(|k| k.period).collect::<Vec<_>>(),
        vec![
            Period::Month(ymd(2024, 1, 1)),
            Period::Month(ymd(2024, 2, 1)),
            Period::Month(ymd(2024, 3, 1)),
        ]
    );
    for kpi in &kpis {
        assert_eq!(kpi.mean_abs_error, Some(0.0));
        assert_eq!(kpi.mean_bias, Some(0.0));
        assert_eq!(kpi.accuracy, Some(1.0));
    }
}

#[test]
fn test_full_analysis_workflow() {
    // 1. Performance of planner forecasts at a one-month lag
    let (sales, forecasts) = create_sample_data();
    let kpis = align(&forecasts, &sales, 1);
    assert_eq!(kpis.len(), 11);
    assert_eq!(kpis[0].period, Period::Month(ymd(2024, 2, 1)));
    assert!(kpis
        .iter()
        .all(|k| k.accuracy.map_or(false, |a| (0.0..=1.0).contains(&a))));

    // 2. The statistical measure matches actuals exactly at lag zero
    let statistical = planning_core::align_with(&forecasts, &sales, 0, ForecastMeasure::Statistical);
    assert!(statistical.iter().all(|k| k.accuracy == Some(1.0)));

    // 3. Tabular path agrees with the typed path
    let tabular = align_frames(
        &forecasts_frame(&forecasts).unwrap(),
        &sales_frame(&sales).unwrap(),
        1,
        ForecastMeasure::Planner,
        DateParsing::Strict,
    )
    .unwrap();
    assert_eq!(tabular, kpis);
    assert_eq!(kpi_frame(&tabular).unwrap().height(), 11);

    // 4. Monthly series summed over warehouses
    let series = sales_series(&sales, Some("SKU-1")).unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series.values()[0], 200.0);

    // 5. The September spike is the only outlier
    let report = detect(&series, 3.0).unwrap();
    let flagged: Vec<NaiveDate> = report.outliers().map(|p| p.date).collect();
    assert_eq!(flagged, vec![ymd(2024, 9, 1)]);

    // 6. A year-long forecast starts in January 2025
    let result = forecast(&series, ArimaOrder::new(0, 0, 0), 12).unwrap();
    assert_eq!(result.len(), 12);
    assert_eq!(result.dates()[0], ymd(2025, 1, 1));
    assert_eq!(result.dates()[11], ymd(2025, 12, 1));
}

#[test]
fn test_errors_are_distinguishable() {
    let short = planning_core::TimeSeries::from_values(ymd(2024, 1, 1), &[1.0, 2.0]).unwrap();
    assert!(forecast(&short, ArimaOrder::default(), 12).unwrap().is_empty());

    let flat = planning_core::TimeSeries::from_values(ymd(2024, 1, 1), &[4.0; 6]).unwrap();
    let err = forecast(&flat, ArimaOrder::default(), 12).unwrap_err();
    assert!(matches!(err, PlanningError::ModelFit(_)));

    let err = planning_core::prepare_monthly(Vec::<(NaiveDate, f64)>::new()).unwrap_err();
    assert!(matches!(err, PlanningError::InvalidSeries(_)));
}
