//! CSV-backed table storage
//!
//! Each table lives in `<data_dir>/<table>.csv` with the internal column
//! names as header. Sales and forecasts grow by appending; product master
//! and geography are overwritten by every upload.

use crate::error::{Result, StoreError};
use crate::ingest::{read_csv, read_upload};
use crate::records::{GeographyRecord, ProductRecord};
use crate::schema::{TableKind, WriteMode};
use planning_core::data::{
    forecasts_from_frame, require_columns, sales_from_frame, text_column,
};
use planning_core::{DateParsing, ForecastRecord, SalesRecord};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Where the store keeps its files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Outcome of storing one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub table: TableKind,
    pub rows: usize,
    pub mode: WriteMode,
}

/// Table store rooted at a data directory
#[derive(Debug, Clone)]
pub struct PlanningStore {
    config: StoreConfig,
}

impl PlanningStore {
    /// Open the store, creating its data directory when needed
    pub fn open(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        info!(data_dir = %config.data_dir.display(), "opened planning store");
        Ok(Self { config })
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn table_path(&self, kind: TableKind) -> PathBuf {
        self.config.data_dir.join(format!("{}.csv", kind.key()))
    }

    /// Validate an upload file and store it with the table's write mode.
    ///
    /// Nothing is written unless every row converts to the table's schema.
    pub fn import<P: AsRef<Path>>(
        &self,
        kind: TableKind,
        path: P,
        dates: DateParsing,
    ) -> Result<ImportSummary> {
        let path = path.as_ref();
        debug!(table = %kind, file = %path.display(), "reading upload");
        let df = read_upload(kind, path, dates)?;
        self.store_frame(kind, &df, dates)
    }

    /// Store a frame already in the internal schema of `kind`
    pub fn insert(&self, kind: TableKind, df: &DataFrame) -> Result<ImportSummary> {
        self.store_frame(kind, df, DateParsing::Strict)
    }

    fn store_frame(&self, kind: TableKind, df: &DataFrame, dates: DateParsing) -> Result<ImportSummary> {
        match kind {
            TableKind::Sales => {
                let records = sales_from_frame(df, dates)?;
                warn_dropped(kind, df.height(), records.len());
                self.write_records(kind, &records)
            }
            TableKind::Forecasts => {
                let records = forecasts_from_frame(df, dates)?;
                warn_dropped(kind, df.height(), records.len());
                self.write_records(kind, &records)
            }
            TableKind::ProductMaster | TableKind::Geography => self.write_text(kind, df),
        }
    }

    fn write_text(&self, kind: TableKind, df: &DataFrame) -> Result<ImportSummary> {
        let columns = kind.internal_columns();
        require_columns(df, &columns)?;

        let values = columns
            .iter()
            .map(|name| text_column(df, name))
            .collect::<planning_core::Result<Vec<_>>>()?;

        let mode = kind.write_mode();
        self.write_table(kind, mode, |writer| {
            for row in 0..df.height() {
                writer.write_record(values.iter().map(|col| col[row].as_deref().unwrap_or("")))?;
            }
            Ok(())
        })?;

        self.log_write(kind, df.height(), mode);
        Ok(ImportSummary {
            table: kind,
            rows: df.height(),
            mode,
        })
    }

    /// Append typed sales records
    pub fn append_sales(&self, records: &[SalesRecord]) -> Result<ImportSummary> {
        self.write_records(TableKind::Sales, records)
    }

    /// Append typed forecast records
    pub fn append_forecasts(&self, records: &[ForecastRecord]) -> Result<ImportSummary> {
        self.write_records(TableKind::Forecasts, records)
    }

    fn write_records<T: Serialize>(&self, kind: TableKind, records: &[T]) -> Result<ImportSummary> {
        let mode = kind.write_mode();
        self.write_table(kind, mode, |writer| {
            for record in records {
                writer.serialize(record)?;
            }
            Ok(())
        })?;

        self.log_write(kind, records.len(), mode);
        Ok(ImportSummary {
            table: kind,
            rows: records.len(),
            mode,
        })
    }

    fn log_write(&self, kind: TableKind, rows: usize, mode: WriteMode) {
        match mode {
            WriteMode::Append => info!(table = %kind, rows, "appended rows"),
            WriteMode::Replace => info!(table = %kind, rows, "replaced table contents"),
        }
    }

    /// Appends go straight to a non-empty table. Anything else is staged in
    /// a temporary file next to the table and renamed over it once complete,
    /// so a failed write leaves the previous contents in place.
    fn write_table<F>(&self, kind: TableKind, mode: WriteMode, write_rows: F) -> Result<()>
    where
        F: FnOnce(&mut ::csv::Writer<&File>) -> Result<()>,
    {
        let path = self.table_path(kind);

        if mode == WriteMode::Append && self.exists(kind) {
            let file = OpenOptions::new().append(true).open(&path)?;
            let mut writer = ::csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&file);
            write_rows(&mut writer)?;
            writer.flush()?;
            return Ok(());
        }

        let staged = NamedTempFile::new_in(self.data_dir())?;
        {
            let mut writer = ::csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(staged.as_file());
            writer.write_record(kind.internal_columns())?;
            write_rows(&mut writer)?;
            writer.flush()?;
        }
        staged.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        debug!(table = %kind, path = %path.display(), "table file written");
        Ok(())
    }

    fn exists(&self, kind: TableKind) -> bool {
        fs::metadata(self.table_path(kind))
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }

    /// Whole table as a text frame; a table never written is empty
    pub fn table(&self, kind: TableKind) -> Result<DataFrame> {
        if !self.exists(kind) {
            return empty_table(kind);
        }
        read_csv(self.table_path(kind))
    }

    /// First `limit` rows of a table
    pub fn preview(&self, kind: TableKind, limit: usize) -> Result<DataFrame> {
        Ok(self.table(kind)?.head(Some(limit)))
    }

    pub fn row_count(&self, kind: TableKind) -> Result<usize> {
        Ok(self.table(kind)?.height())
    }

    /// Stored sales, in insertion order
    pub fn sales(&self, dates: DateParsing) -> Result<Vec<SalesRecord>> {
        let df = self.table(TableKind::Sales)?;
        Ok(sales_from_frame(&df, dates)?)
    }

    /// Stored forecasts, in insertion order
    pub fn forecasts(&self, dates: DateParsing) -> Result<Vec<ForecastRecord>> {
        let df = self.table(TableKind::Forecasts)?;
        Ok(forecasts_from_frame(&df, dates)?)
    }

    pub fn products(&self) -> Result<Vec<ProductRecord>> {
        self.read_records(TableKind::ProductMaster)
    }

    pub fn geography(&self) -> Result<Vec<GeographyRecord>> {
        self.read_records(TableKind::Geography)
    }

    fn read_records<T: DeserializeOwned>(&self, kind: TableKind) -> Result<Vec<T>> {
        if !self.exists(kind) {
            return Ok(Vec::new());
        }
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_path(self.table_path(kind))?;

        reader
            .deserialize()
            .map(|row| row.map_err(StoreError::from))
            .collect()
    }
}

fn warn_dropped(kind: TableKind, received: usize, kept: usize) {
    if kept < received {
        warn!(table = %kind, dropped = received - kept, "skipped rows without a usable date");
    }
}

fn empty_table(kind: TableKind) -> Result<DataFrame> {
    let columns = kind
        .internal_columns()
        .into_iter()
        .map(|name| Series::new(name, Vec::<String>::new()))
        .collect::<Vec<_>>();
    Ok(DataFrame::new(columns)?)
}
