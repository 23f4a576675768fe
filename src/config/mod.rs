//! Configuration for the FARS reader.

use std::path::PathBuf;

use crate::loader::{FileSource, LoadOptions};
use crate::year::{DEFAULT_FILE_PATTERN, PatternResolver};

/// Default number of rows per decoded record batch
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Configuration for locating and loading yearly sources
#[derive(Debug, Clone)]
pub struct FarsConfig {
    /// Directory holding the yearly files
    pub data_dir: PathBuf,
    /// File-name pattern with a `{year}` placeholder
    pub file_pattern: String,
    /// Rows per decoded record batch
    pub batch_size: usize,
    /// Rows used for CSV schema inference (`None` reads the whole file)
    pub infer_rows: Option<usize>,
    /// Load years on the rayon pool
    pub parallel: bool,
}

impl Default for FarsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            infer_rows: None,
            parallel: false,
        }
    }
}

impl FarsConfig {
    /// Create a config for a data directory with default settings
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Set the file-name pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Set the batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Limit CSV schema inference to the leading rows
    #[must_use]
    pub fn with_infer_rows(mut self, rows: usize) -> Self {
        self.infer_rows = Some(rows);
        self
    }

    /// Enable or disable parallel year loading
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the resolver described by this config
    #[must_use]
    pub fn resolver(&self) -> PatternResolver {
        PatternResolver::new(&self.data_dir, &self.file_pattern)
    }

    /// Loader options described by this config
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            batch_size: self.batch_size,
            infer_rows: self.infer_rows,
        }
    }

    /// Build a file-backed table source
    #[must_use]
    pub fn source(&self) -> FileSource<PatternResolver> {
        FileSource::new(self.resolver(), self.load_options())
    }
}
