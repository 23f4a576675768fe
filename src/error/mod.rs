//! Error handling for the FARS reader.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::year::YearId;

/// Specialized error type for loading and querying FARS tables
#[derive(Debug, Error)]
pub enum FarsError {
    /// The resolved source for a year does not exist
    #[error("file '{}' does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    /// The state code is not among the codes observed in the year's data
    #[error("invalid STATE number: {state} (not present in {year} data)")]
    InvalidState { state: String, year: YearId },

    /// A state code given as text that is not an integer
    #[error("invalid STATE number: '{0}'")]
    InvalidStateCode(String),

    /// A year identifier that is not an integer
    #[error("invalid year: '{0}'")]
    InvalidYearId(String),

    /// The source file name does not map to a known table format
    #[error("unsupported source format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A column the pipeline depends on is absent
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A column could not be read with the required type
    #[error("column '{column}' cannot be read as {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// A required value is null
    #[error("column '{column}' has no value at row {row}")]
    MissingValue { column: String, row: usize },

    /// Error opening or reading a file
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error decoding delimited data or computing over Arrow arrays
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error decoding Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
}

impl FarsError {
    /// Build an IO error that names the file involved
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the requested source is absent
    #[must_use]
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }
}

/// Result type for FARS reader operations
pub type Result<T> = std::result::Result<T, FarsError>;
