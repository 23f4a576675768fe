//! A Rust library for loading yearly FARS crash record files, summarizing
//! fatalities by month and year, and extracting cleaned accident locations
//! for a single state.

pub mod config;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod state;
pub mod summary;
pub mod table;
pub mod utils;
pub mod year;

#[cfg(test)]
mod test_support;

// Re-export the most common types for easier use
// Core types
pub use config::FarsConfig;
pub use error::{FarsError, Result};
pub use table::RecordTable;
pub use year::{PatternResolver, SourceResolver, YearId, make_filename};

// Loading
pub use loader::{FileSource, LoadOptions, SourceFormat, TableSource, load_table};

// Ingestion and aggregation
pub use ingest::{Ingestion, Ingestor, InvalidYear, ProjectedRow, YearOutcome, ingest_years};
pub use summary::{
    CountCell, DEFAULT_CAPTION, Summary, SummaryMatrix, summarize_with_config, summarize_years,
};

// State locations
pub use state::{GeoRecord, MapData, StateCode, StateMap, StateQuery, Viewport, filter_state};

// Arrow types
pub use arrow::record_batch::RecordBatch;
