use arrow::{
    array::{new_empty_array, Array, ArrayRef},
    compute::{concat, concat_batches},
    datatypes::{DataType, SchemaRef},
    record_batch::RecordBatch,
    util::pretty::pretty_format_batches,
};
use std::fmt;

use crate::error::{FetchError, Result};

/// An exported dataset held in memory: one schema, any number of record batches.
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn data_type(&self, column: &str) -> Option<&DataType> {
        self.schema
            .field_with_name(column)
            .ok()
            .map(|f| f.data_type())
    }

    /// The named column across all batches as a single array.
    pub fn column(&self, name: &str) -> Result<ArrayRef> {
        let idx = self
            .schema
            .index_of(name)
            .map_err(|_| FetchError::UnknownColumn(name.to_string()))?;

        match self.batches.as_slice() {
            [] => Ok(new_empty_array(self.schema.field(idx).data_type())),
            [only] => Ok(only.column(idx).clone()),
            batches => {
                let parts: Vec<&dyn Array> =
                    batches.iter().map(|b| b.column(idx).as_ref()).collect();
                Ok(concat(&parts)?)
            }
        }
    }

    /// First `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Self {
        let mut remaining = n;
        let mut batches = Vec::new();
        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(batch.num_rows());
            batches.push(batch.slice(0, take));
            remaining -= take;
        }
        Self::new(self.schema.clone(), batches)
    }

    /// Collapse every batch into one.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        Ok(concat_batches(&self.schema, &self.batches)?)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.batches.is_empty() {
            return write!(f, "[{}] (0 rows)", self.column_names().join(", "));
        }
        let rendered = pretty_format_batches(&self.batches).map_err(|_| fmt::Error)?;
        write!(f, "{}", rendered)
    }
}
