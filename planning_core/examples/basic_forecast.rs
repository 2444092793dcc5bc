use chrono::NaiveDate;
use planning_core::models::{forecast, ArimaOrder};
use planning_core::outliers::detect;
use planning_core::series::sales_series;
use planning_core::{align, SalesRecord, ForecastRecord};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Planning Core: Basic Forecasting Example");
    println!("========================================\n");

    let (sales, forecasts) = create_sample_data();
    println!(
        "Sample data created: {} sales rows, {} forecast rows\n",
        sales.len(),
        forecasts.len()
    );

    // Planner forecasts measured one month after they were made
    println!("Forecast performance (offset 1 month):");
    for kpi in align(&forecasts, &sales, 1) {
        println!(
            "  {}: actual {:>6.0}  forecast {:>6.0}  accuracy {}",
            kpi.period,
            kpi.actual_units,
            kpi.forecast_units,
            kpi.accuracy
                .map(|a| format!("{:.1}%", a * 100.0))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let series = sales_series(&sales, Some("SKU-100"))?;

    println!("\nOutliers (|z| >= 2.5):");
    let report = detect(&series, 2.5)?;
    for point in report.outliers() {
        println!("  {}: {:.0} (z = {:.2})", point.date, point.value, point.z_score);
    }

    println!("\nStatistical forecast, ARIMA(1,1,1):");
    let result = forecast(&series, ArimaOrder::default(), 6)?;
    for point in &result.points {
        println!("  {}: {:.1}", point.date, point.value);
    }
    if let Some(model) = &result.model {
        println!(
            "\nAR {:?}, MA {:?}, residual variance {:.2}",
            model.ar_coefficients, model.ma_coefficients, model.residual_variance
        );
    }

    Ok(())
}

/// Two years of monthly sales with a trend, a yearly cycle and one spike
fn create_sample_data() -> (Vec<SalesRecord>, Vec<ForecastRecord>) {
    let mut sales = Vec::new();
    let mut forecasts = Vec::new();

    for i in 0..24u32 {
        let date = NaiveDate::from_ymd_opt(2023 + (i / 12) as i32, i % 12 + 1, 1).unwrap();
        let season = ((i % 12) as f64 / 12.0 * std::f64::consts::TAU).sin() * 20.0;
        let mut units = 200.0 + 3.0 * i as f64 + season;
        if i == 15 {
            units *= 2.5;
        }

        sales.push(SalesRecord {
            date,
            sku: "SKU-100".to_string(),
            actual_units: units.round() as i64,
            geolocation: Some("DE".to_string()),
            warehouse: Some("Central".to_string()),
        });
        forecasts.push(ForecastRecord {
            version_date: NaiveDate::from_ymd_opt(2022, 12, 1).unwrap(),
            date,
            sku: "SKU-100".to_string(),
            forecast_units: Some((200.0 + 3.0 * i as f64).round() as i64),
            statistical_units: None,
            geolocation: Some("DE".to_string()),
            warehouse: Some("Central".to_string()),
        });
    }

    (sales, forecasts)
}
