//! Loader for delimited position files.
//!
//! Reads a CSV (or other single-character delimited) file into a
//! [`CsvTable`] of string cells. Rows that cannot be used are dropped and
//! counted rather than aborting the load:
//! - rows whose field count differs from the first record's
//! - rows that are not valid UTF-8
//!
//! How the first record is treated is set by [`HeaderMode`]. By default it
//! always holds the column names, even when it looks numeric.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LoaderConfig;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// How the first record of a file is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// The first record is always the header row.
    #[default]
    FirstRow,
    /// There is no header; every record is data.
    None,
    /// The first record is data if every field is numeric, a header otherwise.
    Auto,
}

impl HeaderMode {
    /// Whether `record`, the first record of a file, holds column names.
    fn is_header(self, record: &StringRecord) -> bool {
        match self {
            HeaderMode::FirstRow => true,
            HeaderMode::None => false,
            HeaderMode::Auto => !is_numeric_record(record),
        }
    }
}

impl FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first_row" | "first-row" => Ok(HeaderMode::FirstRow),
            "none" => Ok(HeaderMode::None),
            "auto" => Ok(HeaderMode::Auto),
            other => Err(format!(
                "unknown header mode '{}' (expected first_row, none or auto)",
                other
            )),
        }
    }
}

/// Which side of the comparison a table plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    GroundTruth,
    Measured,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::GroundTruth => write!(f, "ground truth"),
            TableRole::Measured => write!(f, "measured"),
        }
    }
}

/// A delimited table as read from disk, before any numeric conversion.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Column names, if the first record was read as a header.
    pub headers: Option<Vec<String>>,
    /// Number of fields per row, fixed by the first record.
    pub num_columns: usize,
    /// Retained rows, each exactly `num_columns` cells long.
    pub rows: Vec<Vec<String>>,
    /// Number of malformed rows dropped while loading.
    pub skipped_rows: usize,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl CsvTable {
    /// Build a headerless table from in-memory rows.
    ///
    /// The column count is taken from the first row (0 when empty).
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let num_columns = rows.first().map_or(0, |row| row.len());
        Self {
            headers: None,
            num_columns,
            rows,
            skipped_rows: 0,
            source_path: None,
        }
    }

    /// Returns the number of retained data rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no data rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Source path for messages, or `<memory>` for in-memory tables.
    pub fn source_display(&self) -> String {
        self.source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Load a delimited position table from a file.
///
/// # Arguments
///
/// * `path` - Path to the delimited text file
/// * `config` - Loader configuration (uses defaults if None)
///
/// # Returns
///
/// A `CsvTable` with every well-formed row of the file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, or if it contains
/// no usable data rows.
pub fn load_table<P: AsRef<Path>>(path: P, config: Option<&LoaderConfig>) -> Result<CsvTable> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let mut table = read_table(BufReader::new(file), config)?;
    table.source_path = Some(path.to_path_buf());

    if table.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    if table.skipped_rows > 0 {
        warn!(
            "{}: skipped {} malformed row(s)",
            path.display(),
            table.skipped_rows
        );
    }
    info!(
        "Loaded {} rows x {} columns from {}",
        table.num_rows(),
        table.num_columns,
        path.display()
    );

    Ok(table)
}

/// Read a delimited table from any reader.
///
/// Same parsing rules as [`load_table`], except that an empty input yields
/// an empty table instead of an error.
pub fn read_table<R: Read>(reader: R, config: Option<&LoaderConfig>) -> Result<CsvTable> {
    let default_config = LoaderConfig::default();
    let config = config.unwrap_or(&default_config);

    if !config.delimiter.is_ascii() {
        return Err(LoaderError::InvalidDelimiter(config.delimiter));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(config.delimiter as u8)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut num_columns: Option<usize> = None;
    let mut rows = Vec::new();
    let mut skipped_rows = 0;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if is_row_error(&e) => {
                debug!("Skipping unreadable row: {}", e);
                skipped_rows += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let expected = match num_columns {
            Some(n) => n,
            None => {
                // First record fixes the shape of the table
                num_columns = Some(record.len());
                if config.header.is_header(&record) {
                    headers = Some(record.iter().map(str::to_string).collect());
                    continue;
                }
                record.len()
            }
        };

        if record.len() != expected {
            debug!(
                "Skipping row at line {}: expected {} fields, found {}",
                record.position().map_or(0, |p| p.line()),
                expected,
                record.len()
            );
            skipped_rows += 1;
            continue;
        }

        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvTable {
        headers,
        num_columns: num_columns.unwrap_or(0),
        rows,
        skipped_rows,
        source_path: None,
    })
}

/// Errors confined to a single row, which are skipped instead of failing the load.
fn is_row_error(error: &csv::Error) -> bool {
    matches!(
        error.kind(),
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}

/// True if every field of the record parses as a number.
fn is_numeric_record(record: &StringRecord) -> bool {
    !record.is_empty() && record.iter().all(|field| field.parse::<f64>().is_ok())
}
