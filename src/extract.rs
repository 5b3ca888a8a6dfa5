//! # Table Extraction
//!
//! This module reads the hindcast inputs from CSV or Parquet tables into the
//! in-memory types the evaluator works with.
//!
//! ## Key Components
//!
//! - [`read_table`]: Loads a CSV or Parquet file into a Polars DataFrame
//! - [`dataframe_to_matrix`]: Converts an all-numeric DataFrame to a dense matrix
//! - [`load_decomposition`]: Builds a [`Decomposition`] from three tables
//! - [`TableSeriesProvider`]: Reads a precomputed target index from a table
//!
//! Row `i` of a table is row `i` of the matrix; columns keep their file order.
//! CSV files are expected to carry a header row.

use crate::decomposition::Decomposition;
use crate::error::{HindcastError, HindcastResult};
use crate::input::{InputPaths, Region};
use crate::series::{TargetSeries, TargetSeriesProvider};
use crate::split::{date, parse_date};
use chrono::{NaiveDate, TimeDelta};
use log::debug;
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Day zero of the Polars `Date` type
pub(crate) const UNIX_EPOCH_DATE: NaiveDate = date(1970, 1, 1);

/// On-disk table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Picks the format from the file extension; anything that is not
    /// `.parquet`/`.pq` is treated as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") || ext.eq_ignore_ascii_case("pq") => {
                TableFormat::Parquet
            }
            _ => TableFormat::Csv,
        }
    }
}

/// Reads a CSV or Parquet file into a DataFrame.
pub fn read_table<P: AsRef<Path>>(path: P) -> HindcastResult<DataFrame> {
    let path = path.as_ref();
    debug!("Reading table: {}", path.display());
    let df = match TableFormat::from_path(path) {
        TableFormat::Parquet => {
            let file = File::open(path)?;
            ParquetReader::new(file).finish()?
        }
        TableFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
    };
    debug!("Table shape: {:?}", df.shape());
    Ok(df)
}

/// Converts every column of `df` to `f64` and stacks them as matrix columns.
pub fn dataframe_to_matrix(df: &DataFrame) -> HindcastResult<DMatrix<f64>> {
    let (nrows, ncols) = df.shape();
    let mut matrix = DMatrix::zeros(nrows, ncols);
    for (j, column) in df.get_columns().iter().enumerate() {
        let values = column_to_f64(column)?;
        for (i, v) in values.into_iter().enumerate() {
            matrix[(i, j)] = v;
        }
    }
    Ok(matrix)
}

fn column_to_f64(column: &Column) -> HindcastResult<Vec<f64>> {
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = series.f64()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| HindcastError::MissingValue {
                column: column.name().to_string(),
                row,
            })
        })
        .collect()
}

/// Reads a numeric matrix table.
pub fn read_matrix<P: AsRef<Path>>(path: P) -> HindcastResult<DMatrix<f64>> {
    let df = read_table(path)?;
    dataframe_to_matrix(&df)
}

/// Reads singular values stored either as one column or as one row.
pub fn read_vector<P: AsRef<Path>>(path: P) -> HindcastResult<DVector<f64>> {
    let matrix = read_matrix(path)?;
    match matrix.shape() {
        (_, 1) => Ok(matrix.column(0).into_owned()),
        (1, n) => Ok(DVector::from_iterator(n, matrix.row(0).iter().copied())),
        (_, ncols) => Err(HindcastError::mismatch(
            "singular value table columns",
            1,
            ncols,
        )),
    }
}

/// Loads `U`, `S` and `VT` and validates their mode axes.
///
/// With `transpose_vt` the third table is read as `V` (`n_time × k`).
pub fn load_decomposition<P: AsRef<Path>>(
    u: P,
    s: P,
    vt: P,
    transpose_vt: bool,
) -> HindcastResult<Decomposition> {
    let u = read_matrix(u)?;
    let s = read_vector(s)?;
    let vt = read_matrix(vt)?;
    let vt = if transpose_vt { vt.transpose() } else { vt };
    debug!(
        "Decomposition shapes: U {:?}, S {}, VT {:?}",
        u.shape(),
        s.len(),
        vt.shape()
    );
    Decomposition::new(u, s, vt)
}

/// Converts a date-like column to calendar dates.
///
/// Accepts Polars `Date`, `Datetime` (truncated to the day) and ISO 8601
/// strings (`YYYY-MM-DD`, optionally followed by a time part).
pub fn column_to_dates(column: &Column) -> HindcastResult<Vec<NaiveDate>> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::Date => days_to_dates(series),
        DataType::Datetime(_, _) => {
            let as_date = series.cast(&DataType::Date)?;
            days_to_dates(&as_date)
        }
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                let text = v.ok_or_else(|| HindcastError::MissingValue {
                    column: series.name().to_string(),
                    row,
                })?;
                let day = text.split(['T', ' ']).next().unwrap_or(text);
                parse_date(day)
            })
            .collect(),
        other => Err(HindcastError::invalid(
            "time column",
            series.name(),
            format!("unsupported data type {}", other),
        )),
    }
}

fn days_to_dates(series: &Series) -> HindcastResult<Vec<NaiveDate>> {
    let days = series.cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            let d = v.ok_or_else(|| HindcastError::MissingValue {
                column: series.name().to_string(),
                row,
            })?;
            UNIX_EPOCH_DATE
                .checked_add_signed(TimeDelta::days(d as i64))
                .ok_or_else(|| HindcastError::DateParse {
                    input: d.to_string(),
                    reason: "day offset out of range".to_string(),
                })
        })
        .collect()
}

/// Extracts a target series from named time and value columns.
pub fn dataframe_to_series(
    df: &DataFrame,
    time_column: &str,
    value_column: &str,
) -> HindcastResult<TargetSeries> {
    let times = df
        .column(time_column)
        .map_err(|_| HindcastError::ColumnNotFound(time_column.to_string()))?;
    let values = df
        .column(value_column)
        .map_err(|_| HindcastError::ColumnNotFound(value_column.to_string()))?;
    TargetSeries::new(column_to_dates(times)?, column_to_f64(values)?)
}

/// Target series provider backed by a CSV or Parquet table
///
/// The table holds an index that was already reduced over the region
/// upstream, e.g. a spatially averaged daily anomaly.
#[derive(Debug, Clone)]
pub struct TableSeriesProvider {
    path: PathBuf,
    time_column: String,
    value_column: String,
}

impl TableSeriesProvider {
    pub fn new<P: Into<PathBuf>>(path: P, time_column: &str, value_column: &str) -> Self {
        Self {
            path: path.into(),
            time_column: time_column.to_string(),
            value_column: value_column.to_string(),
        }
    }

    /// Provider for `inputs.series`, if configured
    pub fn from_inputs(inputs: &InputPaths) -> Option<Self> {
        inputs
            .series
            .as_ref()
            .map(|path| Self::new(path, &inputs.time_column, &inputs.value_column))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TargetSeriesProvider for TableSeriesProvider {
    fn target_series(&self, region: &Region) -> HindcastResult<TargetSeries> {
        debug!(
            "Loading target series '{}' from {} (region {})",
            self.value_column,
            self.path.display(),
            region
        );
        let df = read_table(&self.path)?;
        dataframe_to_series(&df, &self.time_column, &self.value_column)
    }

    fn describe(&self) -> String {
        format!(
            "{} [{} vs {}]",
            self.path.display(),
            self.value_column,
            self.time_column
        )
    }
}
