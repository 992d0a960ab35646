// src/ingest/assemble.rs

use anyhow::{Context, Result};
use arrow::{compute::concat_batches, record_batch::RecordBatch};

use crate::schema::canonical_schema;

/// Concatenate normalized tables in order. No tables → zero rows, full schema.
pub fn assemble(tables: &[RecordBatch]) -> Result<RecordBatch> {
    let schema = canonical_schema();
    if tables.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }
    concat_batches(&schema, tables).context("concatenating normalized tables")
}
