//! Multi-year ingestion
//!
//! Loads a list of requested years and reduces each to `(month, year)` rows.
//! Every year produces its own [`YearOutcome`]; a year that cannot be loaded
//! or projected becomes an [`InvalidYear`] warning and never aborts the batch.

use std::fmt;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::FarsConfig;
use crate::error::{FarsError, Result};
use crate::loader::TableSource;
use crate::table::{MONTH, RecordTable};
use crate::year::YearId;

/// Minimal row kept after ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProjectedRow {
    pub month: u32,
    pub year: YearId,
}

/// A requested year that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidYear {
    /// The year as it was requested
    pub year: String,
    /// Why the year was skipped
    pub reason: String,
}

impl fmt::Display for InvalidYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid year: {} ({})", self.year, self.reason)
    }
}

/// Result of ingesting one requested year
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearOutcome {
    Loaded { year: YearId, rows: Vec<ProjectedRow> },
    Failed(InvalidYear),
}

impl YearOutcome {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Ordered outcomes for a batch of requested years
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingestion {
    outcomes: Vec<YearOutcome>,
}

impl Ingestion {
    /// One outcome per requested year, in request order
    #[must_use]
    pub fn outcomes(&self) -> &[YearOutcome] {
        &self.outcomes
    }

    /// The successfully loaded years with their rows
    pub fn present(&self) -> impl Iterator<Item = (YearId, &[ProjectedRow])> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            YearOutcome::Loaded { year, rows } => Some((*year, rows.as_slice())),
            YearOutcome::Failed(_) => None,
        })
    }

    /// Warnings for the years that were skipped
    pub fn warnings(&self) -> impl Iterator<Item = &InvalidYear> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            YearOutcome::Failed(invalid) => Some(invalid),
            YearOutcome::Loaded { .. } => None,
        })
    }

    /// All rows of the loaded years, concatenated in request order
    pub fn rows(&self) -> impl Iterator<Item = &ProjectedRow> {
        self.present().flat_map(|(_, rows)| rows.iter())
    }
}

/// Project a loaded table to `(month, year)` rows, in source order
pub fn project_months(table: &RecordTable, year: YearId) -> Result<Vec<ProjectedRow>> {
    table
        .int_column(MONTH)?
        .into_iter()
        .enumerate()
        .map(|(row, month)| {
            let month = month.ok_or_else(|| FarsError::MissingValue {
                column: MONTH.to_string(),
                row,
            })?;
            let month = u32::try_from(month).map_err(|_| FarsError::ColumnType {
                column: MONTH.to_string(),
                expected: "month number",
            })?;
            Ok(ProjectedRow { month, year })
        })
        .collect()
}

/// Drives a [`TableSource`] across a list of years
pub struct Ingestor<'a, S: ?Sized> {
    source: &'a S,
    parallel: bool,
    progress: Option<ProgressBar>,
}

impl<'a, S: TableSource + ?Sized> Ingestor<'a, S> {
    /// Create a sequential ingestor over a source
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            parallel: false,
            progress: None,
        }
    }

    /// Create an ingestor that follows the config's parallel setting
    pub fn with_config(source: &'a S, config: &FarsConfig) -> Self {
        Self::new(source).parallel(config.parallel)
    }

    /// Load years on the rayon pool
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Tick a progress bar once per finished year
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Ingest already-parsed years
    pub fn ingest(&self, years: &[YearId]) -> Ingestion {
        let requests: Vec<std::result::Result<YearId, InvalidYear>> =
            years.iter().copied().map(Ok).collect();
        self.run(requests)
    }

    /// Ingest years given as text
    ///
    /// A label that is not a number is reported as an [`InvalidYear`] like
    /// any other failed year.
    pub fn ingest_requested<T: AsRef<str>>(&self, years: &[T]) -> Ingestion {
        let requests = years
            .iter()
            .map(|label| {
                let label = label.as_ref();
                label.parse::<YearId>().map_err(|e| InvalidYear {
                    year: label.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect();
        self.run(requests)
    }

    fn run(&self, requests: Vec<std::result::Result<YearId, InvalidYear>>) -> Ingestion {
        info!("Ingesting {} requested years", requests.len());

        let outcomes: Vec<YearOutcome> = if self.parallel {
            // Indexed collect keeps request order
            requests
                .into_par_iter()
                .map(|request| self.ingest_one(request))
                .collect()
        } else {
            requests
                .into_iter()
                .map(|request| self.ingest_one(request))
                .collect()
        };

        let loaded = outcomes.iter().filter(|o| o.is_loaded()).count();
        info!(
            "Ingested {loaded} of {} requested years",
            outcomes.len()
        );

        Ingestion { outcomes }
    }

    fn ingest_one(&self, request: std::result::Result<YearId, InvalidYear>) -> YearOutcome {
        let outcome = match request {
            Ok(year) => match self.load_and_project(year) {
                Ok(rows) => {
                    debug!("Year {year}: {} rows", rows.len());
                    YearOutcome::Loaded { year, rows }
                }
                Err(e) => YearOutcome::Failed(InvalidYear {
                    year: year.to_string(),
                    reason: e.to_string(),
                }),
            },
            Err(invalid) => YearOutcome::Failed(invalid),
        };

        if let YearOutcome::Failed(invalid) = &outcome {
            warn!("{invalid}");
        }
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }

        outcome
    }

    fn load_and_project(&self, year: YearId) -> Result<Vec<ProjectedRow>> {
        debug!("Loading year {year} from {}", self.source.locate(year));
        let table = self.source.load_year(year)?;
        project_months(&table, year)
    }
}

/// Ingest years sequentially
pub fn ingest_years<S: TableSource + ?Sized>(source: &S, years: &[YearId]) -> Ingestion {
    Ingestor::new(source).ingest(years)
}
