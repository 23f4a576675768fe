//! In-memory table source for unit tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{FarsError, Result};
use crate::loader::TableSource;
use crate::table::{LATITUDE, LONGITUDE, MONTH, RecordTable, STATE};
use crate::year::YearId;

/// Serves tables built in memory, keyed by year
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: HashMap<YearId, RecordTable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a year whose rows only differ by month
    pub fn with_months(self, year: i32, months: &[i64]) -> Self {
        let months: Vec<Option<i64>> = months.iter().copied().map(Some).collect();
        self.with_optional_months(year, &months)
    }

    /// Add a year whose month column may contain nulls
    pub fn with_optional_months(self, year: i32, months: &[Option<i64>]) -> Self {
        let n = months.len();
        self.with_columns(
            year,
            Arc::new(Int64Array::from(vec![1; n])),
            Arc::new(Int64Array::from(months.to_vec())),
            Arc::new(Float64Array::from(vec![-86.0; n])),
            Arc::new(Float64Array::from(vec![32.0; n])),
        )
    }

    /// Add a year of `(state, longitude, latitude)` rows in January
    pub fn with_locations(self, year: i32, rows: &[(i64, f64, f64)]) -> Self {
        self.with_columns(
            year,
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.0))),
            Arc::new(Int64Array::from(vec![1; rows.len()])),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.1))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))),
        )
    }

    fn with_columns(
        mut self,
        year: i32,
        state: ArrayRef,
        month: ArrayRef,
        longitude: ArrayRef,
        latitude: ArrayRef,
    ) -> Self {
        let schema = Arc::new(Schema::new(vec![
            Field::new(STATE, DataType::Int64, true),
            Field::new(MONTH, DataType::Int64, true),
            Field::new(LONGITUDE, DataType::Float64, true),
            Field::new(LATITUDE, DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(schema.clone(), vec![state, month, longitude, latitude])
            .expect("columns match schema");
        let year = YearId::new(year);
        self.tables.insert(
            year,
            RecordTable::new(self.path(year), schema, vec![batch]),
        );
        self
    }

    fn path(&self, year: YearId) -> PathBuf {
        PathBuf::from(format!("memory://accident_{year}"))
    }
}

impl TableSource for MemorySource {
    fn locate(&self, year: YearId) -> String {
        self.path(year).display().to_string()
    }

    fn load_year(&self, year: YearId) -> Result<RecordTable> {
        self.tables
            .get(&year)
            .cloned()
            .ok_or_else(|| FarsError::SourceNotFound {
                path: self.path(year),
            })
    }
}
