//! # apex-planner
//!
//! Command-line interface for importing planning data and running analyses.

use apex_planner::output::{write_frame, write_rows};
use apex_planner::{OutputFormat, PerformanceQuery, Planner, PlannerConfig, PlannerError};
use clap::{Parser, Subcommand};
use planning_core::{ArimaOrder, DateParsing, ForecastMeasure, KpiLevel};
use planning_store::TableKind;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apex-planner")]
#[command(about = "Demand-planning data management and analysis", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the stored tables (overrides the configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// How unparseable dates are handled (strict, lenient)
    #[arg(long, global = true)]
    date_parsing: Option<DateParsing>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "csv")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an upload CSV and store it
    Import {
        /// Target table (sales, forecasts, product_master, geography)
        table: TableKind,

        /// Upload file with the table's column headers
        file: PathBuf,
    },

    /// Show the first rows of a stored table
    Preview {
        /// Table to show
        table: TableKind,

        /// Number of rows
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Forecast accuracy against actuals
    Performance {
        /// Restrict to one SKU
        #[arg(short, long)]
        sku: Option<String>,

        /// Months forecasts are shifted before matching actuals
        #[arg(short, long, allow_hyphen_values = true)]
        offset: Option<i32>,

        /// Forecast measure (planner, statistical)
        #[arg(short, long)]
        measure: Option<ForecastMeasure>,

        /// KPI level (monthly, ytd)
        #[arg(short, long)]
        level: Option<KpiLevel>,
    },

    /// Statistical ARIMA forecast of monthly sales
    Forecast {
        /// Restrict to one SKU
        #[arg(short, long)]
        sku: Option<String>,

        /// Months to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// ARIMA order as p,d,q
        #[arg(long)]
        order: Option<ArimaOrder>,
    },

    /// Z-score outliers of monthly sales
    Outliers {
        /// Restrict to one SKU
        #[arg(short, long)]
        sku: Option<String>,

        /// Absolute z-score at which a month is flagged
        #[arg(short, long)]
        threshold: Option<f64>,
    },
}

fn load_config(cli: &Cli) -> Result<PlannerConfig, PlannerError> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(policy) = cli.date_parsing {
        config.date_parsing = policy;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), PlannerError> {
    let planner = Planner::new(load_config(&cli)?)?;
    let out = io::stdout().lock();

    match cli.command {
        Commands::Import { table, file } => {
            let summary = planner.import(table, &file)?;
            tracing::info!(
                "stored {} rows in {} ({:?})",
                summary.rows,
                summary.table,
                summary.mode
            );
            let preview = planner.preview(table, 50)?;
            write_frame(&preview, cli.format, out)?;
        }
        Commands::Preview { table, limit } => {
            let preview = planner.preview(table, limit)?;
            write_frame(&preview, cli.format, out)?;
        }
        Commands::Performance {
            sku,
            offset,
            measure,
            level,
        } => {
            let query = PerformanceQuery {
                sku,
                offset_months: offset,
                measure,
                level,
            };
            let kpis = planner.performance(&query)?;
            write_rows(&kpis, cli.format, out)?;
        }
        Commands::Forecast {
            sku,
            horizon,
            order,
        } => {
            let result = planner.statistical_forecast(sku.as_deref(), horizon, order)?;
            write_rows(&result.points, cli.format, out)?;
        }
        Commands::Outliers { sku, threshold } => {
            let report = planner.outliers(sku.as_deref(), threshold)?;
            write_rows(&report.points, cli.format, out)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apex_planner=info,planning_store=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(PlannerError::NoData(reason)) => {
            tracing::warn!("No data available: {}", reason);
            ExitCode::from(2)
        }
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
