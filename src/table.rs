//! In-memory record tables
//!
//! A [`RecordTable`] holds one year's decoded rows as Arrow record batches
//! sharing a schema, and offers typed access to the few columns the pipeline
//! consults.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray, Int64Array};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Float64Type, Int64Type, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::{FarsError, Result};

/// Month of the crash (1-12)
pub const MONTH: &str = "MONTH";
/// Numeric state code
pub const STATE: &str = "STATE";
/// Longitude in degrees
pub const LONGITUDE: &str = "LONGITUDE";
/// Latitude in degrees
pub const LATITUDE: &str = "LATITUDE";

/// An ordered table of rows decoded from one source
#[derive(Debug, Clone)]
pub struct RecordTable {
    source: PathBuf,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl RecordTable {
    /// Create a table from decoded batches
    ///
    /// All batches are expected to carry `schema`.
    pub fn new(source: impl Into<PathBuf>, schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            source: source.into(),
            schema,
            batches,
        }
    }

    /// Location the table was loaded from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across all batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Get a column from every batch, cast to `target`
    ///
    /// Numeric and string columns are converted with Arrow's cast kernel;
    /// values that cannot be converted become nulls.
    fn column_as(
        &self,
        column_name: &str,
        target: &DataType,
        expected: &'static str,
    ) -> Result<Vec<ArrayRef>> {
        let idx = self
            .schema
            .index_of(column_name)
            .map_err(|_| FarsError::ColumnNotFound {
                column: column_name.to_string(),
            })?;

        self.batches
            .iter()
            .map(|batch| {
                let column = batch.column(idx);
                if column.data_type() == target {
                    return Ok(column.clone());
                }
                cast(column, target).map_err(|_| FarsError::ColumnType {
                    column: column_name.to_string(),
                    expected,
                })
            })
            .collect()
    }

    /// Read a column as integers, in row order
    pub fn int_column(&self, column_name: &str) -> Result<Vec<Option<i64>>> {
        let arrays = self.column_as(column_name, &DataType::Int64, "integer")?;
        Ok(arrays
            .iter()
            .flat_map(|array| array.as_primitive::<Int64Type>().iter())
            .collect())
    }

    /// Read a column as floats, in row order
    pub fn float_column(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        let arrays = self.column_as(column_name, &DataType::Float64, "float")?;
        Ok(arrays
            .iter()
            .flat_map(|array| array.as_primitive::<Float64Type>().iter())
            .collect())
    }

    /// Distinct non-null integer values of a column
    pub fn distinct_ints(&self, column_name: &str) -> Result<BTreeSet<i64>> {
        Ok(self.int_column(column_name)?.into_iter().flatten().collect())
    }

    /// Keep only the rows whose integer column equals `value`
    ///
    /// Row order is preserved; nulls never match.
    pub fn filter_eq(&self, column_name: &str, value: i64) -> Result<Self> {
        let arrays = self.column_as(column_name, &DataType::Int64, "integer")?;
        let scalar = Int64Array::new_scalar(value);

        let batches = self
            .batches
            .iter()
            .zip(arrays.iter())
            .map(|(batch, column)| {
                let mask = eq(column, &scalar)?;
                Ok(filter_record_batch(batch, &mask)?)
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Filtered {} on {column_name} = {value}: {} of {} rows kept",
            self.source.display(),
            batches.iter().map(RecordBatch::num_rows).sum::<usize>(),
            self.num_rows()
        );

        Ok(Self {
            source: self.source.clone(),
            schema: self.schema.clone(),
            batches,
        })
    }
}
