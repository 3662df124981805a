//! Data loaders for lab CSV captures.
//!
//! Every capture is a CSV file with a header row. Columns are addressed by
//! position: column 0 holds the time (or a row identifier) and the following
//! columns hold measurement channels. The loaders in this module validate the
//! column count and the numeric content of the columns they read, then hand
//! out typed records:
//! - [`CsvTable`] for the leading numeric columns of a capture
//! - [`XySeries`] for the grid plotter (two value columns)
//! - [`ChannelSeries`] for a single gyroscope axis capture

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("{path}: expected at least {required} columns, found {found}")]
    MissingColumns {
        path: PathBuf,
        required: usize,
        found: usize,
    },

    #[error("{path}: row {row}, column {column}: cannot parse '{value}' as a number")]
    ParseError {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A capture whose cells are all numeric.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Header names in column order.
    pub headers: Vec<String>,
    /// Row-major values; every row has `headers.len()` entries.
    pub rows: Vec<Vec<f64>>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl CsvTable {
    /// Creates a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            headers,
            rows,
            source_path: None,
        }
    }

    /// Returns the number of data rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if the table holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copies one column out of the table, or `None` if it does not exist.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.num_columns() {
            return None;
        }
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// The first column, which is the time axis by convention.
    pub fn times(&self) -> Vec<f64> {
        self.column(0).unwrap_or_default()
    }

    /// File name of the source, or a placeholder for in-memory tables.
    pub fn display_name(&self) -> String {
        display_name(self.source_path.as_deref())
    }
}

/// Two value columns of a capture, used for x/y line plots.
#[derive(Debug, Clone)]
pub struct XySeries {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub source_path: Option<PathBuf>,
}

impl XySeries {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn display_name(&self) -> String {
        display_name(self.source_path.as_deref())
    }
}

/// One measurement channel against time.
///
/// Time cells that are not numeric are stored as `NaN`, which marks the
/// timestamps as unavailable for time-step estimation.
#[derive(Debug, Clone)]
pub struct ChannelSeries {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    pub source_path: Option<PathBuf>,
}

impl ChannelSeries {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every timestamp parsed as a finite number.
    pub fn has_timestamps(&self) -> bool {
        !self.time.is_empty() && self.time.iter().all(|t| t.is_finite())
    }
}

fn display_name(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "<memory>".to_string())
}

fn open_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file)))
}

fn parse_cell(path: &Path, record: &StringRecord, row: usize, column: usize) -> Result<f64> {
    let raw = record.get(column).unwrap_or("");
    raw.parse::<f64>().map_err(|_| LoaderError::ParseError {
        path: path.to_path_buf(),
        row,
        column,
        value: raw.to_string(),
    })
}

fn require_columns(path: &Path, found: usize, required: usize) -> Result<()> {
    if found < required {
        return Err(LoaderError::MissingColumns {
            path: path.to_path_buf(),
            required,
            found,
        });
    }
    Ok(())
}

/// Load the first `max_columns` columns of a capture as numbers.
///
/// Columns beyond `max_columns` are never parsed. Rows shorter than the
/// loaded width are rejected as missing columns.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a loaded cell is not numeric,
/// or the file holds no data rows.
pub fn load_leading_columns<P: AsRef<Path>>(path: P, max_columns: usize) -> Result<CsvTable> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .take(max_columns)
        .map(str::to_string)
        .collect();
    let num_columns = headers.len();

    let mut rows = Vec::with_capacity(1024);
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        // 1-based data row number, header excluded
        let row_number = index + 1;
        require_columns(path, record.len(), num_columns)?;

        let mut row = Vec::with_capacity(num_columns);
        for column in 0..num_columns {
            row.push(parse_cell(path, &record, row_number, column)?);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(CsvTable {
        headers,
        rows,
        source_path: Some(path.to_path_buf()),
    })
}

/// Load one value column of a capture. Other columns are not inspected.
pub fn load_value_column<P: AsRef<Path>>(path: P, column: usize) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let required = column + 1;
    require_columns(path, reader.headers()?.len(), required)?;

    let mut values = Vec::with_capacity(1024);
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        require_columns(path, record.len(), required)?;
        values.push(parse_cell(path, &record, index + 1, column)?);
    }

    if values.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(values)
}

/// Load two value columns of a capture as x/y points.
///
/// Axis labels are taken from the header names of the two columns. Cells in
/// other columns are not inspected.
pub fn load_xy_series<P: AsRef<Path>>(path: P, x_column: usize, y_column: usize) -> Result<XySeries> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers = reader.headers()?.clone();
    let required = x_column.max(y_column) + 1;
    require_columns(path, headers.len(), required)?;

    let x_label = headers.get(x_column).unwrap_or_default().to_string();
    let y_label = headers.get(y_column).unwrap_or_default().to_string();

    let mut points = Vec::with_capacity(1024);
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row_number = index + 1;
        require_columns(path, record.len(), required)?;

        let x = parse_cell(path, &record, row_number, x_column)?;
        let y = parse_cell(path, &record, row_number, y_column)?;
        points.push((x, y));
    }

    if points.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(XySeries {
        x_label,
        y_label,
        points,
        source_path: Some(path.to_path_buf()),
    })
}

/// Load column 0 as time and `value_column` as the channel values.
///
/// Values must be numeric; non-numeric time cells become `NaN`.
pub fn load_channel_series<P: AsRef<Path>>(path: P, value_column: usize) -> Result<ChannelSeries> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers = reader.headers()?.clone();
    let required = value_column.max(1) + 1;
    require_columns(path, headers.len(), required)?;

    let mut time = Vec::with_capacity(1024);
    let mut values = Vec::with_capacity(1024);
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row_number = index + 1;
        require_columns(path, record.len(), required)?;

        let t = record
            .get(0)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        time.push(t);
        values.push(parse_cell(path, &record, row_number, value_column)?);
    }

    if values.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(ChannelSeries {
        time,
        values,
        source_path: Some(path.to_path_buf()),
    })
}
