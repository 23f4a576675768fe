//! Yearly table loading
//!
//! Decodes a single source file into a [`RecordTable`]. Delimited files
//! (optionally bzip2-compressed) and Parquet files are supported, picked by
//! file name.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use bzip2::read::MultiBzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::util::{ensure_source_exists, open_source};
use crate::error::{FarsError, Result};
use crate::table::RecordTable;
use crate::utils::logging::{log_operation_complete, log_operation_start};
use crate::year::{SourceResolver, YearId};

/// Encoding of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Plain delimited text with a header row
    Csv,
    /// Delimited text inside a bzip2 stream
    CsvBz2,
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Detect the format from a file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if name.ends_with(".csv.bz2") {
            Ok(Self::CsvBz2)
        } else if name.ends_with(".csv") {
            Ok(Self::Csv)
        } else if name.ends_with(".parquet") {
            Ok(Self::Parquet)
        } else {
            Err(FarsError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Options for decoding a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows per decoded record batch
    pub batch_size: usize,
    /// Rows used for CSV schema inference (`None` reads the whole file)
    pub infer_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            infer_rows: None,
        }
    }
}

/// Load a full table from a source file
///
/// The existence check runs before anything is decoded, so a missing file is
/// always reported as [`FarsError::SourceNotFound`] naming the path.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<RecordTable> {
    ensure_source_exists(path)?;
    let format = SourceFormat::from_path(path)?;

    log_operation_start("Loading", path);
    let start = Instant::now();

    let table = match format {
        SourceFormat::Csv => read_csv(open_source(path)?, path, options)?,
        SourceFormat::CsvBz2 => read_csv(MultiBzDecoder::new(open_source(path)?), path, options)?,
        SourceFormat::Parquet => read_parquet(path, options)?,
    };

    log_operation_complete("loaded", path, table.num_rows(), Some(start.elapsed()));
    Ok(table)
}

/// Decode delimited text with a header row
///
/// The decompressed text is buffered so the schema can be inferred before
/// decoding.
fn read_csv<R: Read>(mut reader: R, path: &Path, options: &LoadOptions) -> Result<RecordTable> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| FarsError::io(path, e))?;

    let format = Format::default().with_header(true);
    let (schema, inferred) = format.infer_schema(Cursor::new(&data), options.infer_rows)?;
    log::debug!(
        "Inferred {} columns from {inferred} rows of {}",
        schema.fields().len(),
        path.display()
    );
    let schema = Arc::new(schema);

    let batches = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(options.batch_size)
        .build(Cursor::new(data))?
        .collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    Ok(RecordTable::new(path, schema, batches))
}

/// Decode a Parquet file
fn read_parquet(path: &Path, options: &LoadOptions) -> Result<RecordTable> {
    let file = open_source(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(options.batch_size)
        .build()?;
    let schema = reader.schema();

    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    Ok(RecordTable::new(path, schema, batches))
}

/// Source of yearly record tables
pub trait TableSource: Send + Sync {
    /// Human-readable location of a year's source
    fn locate(&self, year: YearId) -> String;

    /// Load the table for a year
    fn load_year(&self, year: YearId) -> Result<RecordTable>;
}

/// Loads yearly tables from files named by a [`SourceResolver`]
#[derive(Debug, Clone)]
pub struct FileSource<R> {
    resolver: R,
    options: LoadOptions,
}

impl<R: SourceResolver> FileSource<R> {
    /// Create a file source from a resolver and decoding options
    pub fn new(resolver: R, options: LoadOptions) -> Self {
        Self { resolver, options }
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

impl<R: SourceResolver> TableSource for FileSource<R> {
    fn locate(&self, year: YearId) -> String {
        self.resolver.resolve(year).display().to_string()
    }

    fn load_year(&self, year: YearId) -> Result<RecordTable> {
        load_table(&self.resolver.resolve(year), &self.options)
    }
}
