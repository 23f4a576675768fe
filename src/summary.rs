//! Month-by-year fatality summaries
//!
//! Unions the loaded years, counts rows per `(year, month)` and pivots the
//! counts into a matrix with one row per month and one column per year.

use std::collections::BTreeMap;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::FarsConfig;
use crate::ingest::{Ingestion, Ingestor, InvalidYear, ProjectedRow, ingest_years};
use crate::loader::TableSource;
use crate::year::YearId;

/// Caption used when rendering a summary
pub const DEFAULT_CAPTION: &str = "Number of fatalities by month and year";

/// Header of the month column in a rendered summary
const MONTH_HEADER: &str = "MONTH";

/// Number of rows for one `(year, month)` group; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CountCell {
    pub year: YearId,
    pub month: u32,
    pub count: usize,
}

/// Count rows per `(year, month)`, sorted by year then month
pub fn count_by_year_month<'a>(rows: impl IntoIterator<Item = &'a ProjectedRow>) -> Vec<CountCell> {
    let mut groups: FxHashMap<(YearId, u32), usize> = FxHashMap::default();
    for row in rows {
        *groups.entry((row.year, row.month)).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((year, month), count)| CountCell { year, month, count })
        .sorted()
        .collect()
}

/// Wide count table: rows are months, columns are years
///
/// Only months and years that occur in the counted data are present. A
/// month/year pair without rows is missing rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryMatrix {
    years: Vec<YearId>,
    months: Vec<u32>,
    /// `cells[month_idx][year_idx]`
    cells: Vec<Vec<Option<usize>>>,
}

impl SummaryMatrix {
    /// Pivot long `(year, month, count)` cells into a matrix
    #[must_use]
    pub fn pivot(cells: &[CountCell]) -> Self {
        let years: Vec<YearId> = cells.iter().map(|c| c.year).sorted().dedup().collect();
        let months: Vec<u32> = cells.iter().map(|c| c.month).sorted().dedup().collect();

        let year_idx: BTreeMap<YearId, usize> =
            years.iter().enumerate().map(|(i, y)| (*y, i)).collect();
        let month_idx: BTreeMap<u32, usize> =
            months.iter().enumerate().map(|(i, m)| (*m, i)).collect();

        let mut grid = vec![vec![None; years.len()]; months.len()];
        for cell in cells {
            let slot = &mut grid[month_idx[&cell.month]][year_idx[&cell.year]];
            // Repeated groups in the input add up
            *slot = Some(slot.unwrap_or(0) + cell.count);
        }

        Self {
            years,
            months,
            cells: grid,
        }
    }

    /// Column labels, ascending
    #[must_use]
    pub fn years(&self) -> &[YearId] {
        &self.years
    }

    /// Row labels, ascending
    #[must_use]
    pub fn months(&self) -> &[u32] {
        &self.months
    }

    /// Rows of cells, aligned with [`Self::months`] and [`Self::years`]
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<usize>>] {
        &self.cells
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Count for a month and year, `None` when absent
    #[must_use]
    pub fn get(&self, year: YearId, month: u32) -> Option<usize> {
        let y = self.years.binary_search(&year).ok()?;
        let m = self.months.binary_search(&month).ok()?;
        self.cells[m][y]
    }

    /// Sum of the non-empty cells in a year column
    #[must_use]
    pub fn column_total(&self, year: YearId) -> Option<usize> {
        let y = self.years.binary_search(&year).ok()?;
        Some(self.cells.iter().filter_map(|row| row[y]).sum())
    }

    /// Render as a captioned pipe table with centered cells
    #[must_use]
    pub fn render(&self, caption: &str) -> String {
        let header: Vec<String> = std::iter::once(MONTH_HEADER.to_string())
            .chain(self.years.iter().map(ToString::to_string))
            .collect();

        let body: Vec<Vec<String>> = self
            .months
            .iter()
            .zip(&self.cells)
            .map(|(month, row)| {
                std::iter::once(month.to_string())
                    .chain(row.iter().map(|cell| cell.map(|c| c.to_string()).unwrap_or_default()))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                body.iter()
                    .map(|row| row[col].len())
                    .chain(std::iter::once(header[col].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |cells: &[String]| {
            let inner = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!(" {cell:^width$} "))
                .join("|");
            format!("|{inner}|")
        };

        let rule = widths
            .iter()
            .map(|&width| format!(":{}:", "-".repeat(width)))
            .join("|");

        let mut lines = [
            format!("Table: {caption}"),
            String::new(),
            format_row(&header),
            format!("|{rule}|"),
        ]
        .into_iter()
        .chain(body.iter().map(|row| format_row(row)));
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// A summary matrix together with the years that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub matrix: SummaryMatrix,
    pub warnings: Vec<InvalidYear>,
}

impl Summary {
    /// Aggregate an ingestion; failed years contribute nothing
    #[must_use]
    pub fn from_ingestion(ingestion: &Ingestion) -> Self {
        let cells = count_by_year_month(ingestion.rows());
        let matrix = SummaryMatrix::pivot(&cells);

        log::info!(
            "Summarized {} years across {} months ({} skipped)",
            matrix.years().len(),
            matrix.months().len(),
            ingestion.warnings().count()
        );

        Self {
            matrix,
            warnings: ingestion.warnings().cloned().collect(),
        }
    }
}

/// Load, count and pivot a list of years
pub fn summarize_years<S: TableSource + ?Sized>(source: &S, years: &[YearId]) -> Summary {
    Summary::from_ingestion(&ingest_years(source, years))
}

/// Summarize years from the files a config describes, in parallel when it asks
pub fn summarize_with_config(config: &FarsConfig, years: &[YearId]) -> Summary {
    let source = config.source();
    Summary::from_ingestion(&Ingestor::with_config(&source, config).ingest(years))
}
