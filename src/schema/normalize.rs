// src/schema/normalize.rs

use anyhow::{Context, Result};
use arrow::{
    array::{new_null_array, Array, ArrayRef, TimestampMicrosecondArray},
    compute::{can_cast_types, cast_with_options, CastOptions},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use super::alias;
use super::canonical::{canonical_schema, CanonicalColumn, BUSINESS_COLUMNS, EXTRACTED_AT_TZ};

/// Project an arbitrary trip table onto the canonical schema.
///
/// - business columns are taken from the canonical name or its first known
///   alias, then safely cast to the declared type (unconvertible values → null)
/// - business columns with no source are filled with nulls
/// - `extracted_at` is `extracted_at` for every row
///
/// Row count and order are those of `raw`.
pub fn normalize(raw: &RecordBatch, extracted_at: DateTime<Utc>) -> Result<RecordBatch> {
    let rows = raw.num_rows();
    let schema = raw.schema();
    let available: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(BUSINESS_COLUMNS.len() + 1);
    for col in &BUSINESS_COLUMNS {
        let target = col.ty.data_type();
        let array = match alias::resolve(col.name, &available) {
            Some(source) => {
                let (idx, _) = schema
                    .column_with_name(source)
                    .with_context(|| format!("column `{}` vanished from schema", source))?;
                if source != col.name {
                    debug!(from = source, to = col.name, "renamed column");
                }
                conform(raw.column(idx), col, &target, source)
            }
            None => {
                debug!(column = col.name, rows, "no source column, filling nulls");
                new_null_array(&target, rows)
            }
        };
        columns.push(array);
    }

    let stamp = TimestampMicrosecondArray::from_value(extracted_at.timestamp_micros(), rows)
        .with_timezone(EXTRACTED_AT_TZ);
    columns.push(Arc::new(stamp) as ArrayRef);

    RecordBatch::try_new(canonical_schema(), columns).context("building normalized batch")
}

/// Cast `array` to `target`; uncastable source types become an all-null column.
fn conform(array: &ArrayRef, col: &CanonicalColumn, target: &DataType, source: &str) -> ArrayRef {
    if array.data_type() == target {
        return array.clone();
    }
    if !can_cast_types(array.data_type(), target) {
        warn!(
            column = col.name,
            source,
            from = ?array.data_type(),
            to = ?target,
            "unsupported cast, filling nulls"
        );
        return new_null_array(target, array.len());
    }
    match cast_with_options(array, target, &CastOptions::default()) {
        Ok(cast) => cast,
        Err(e) => {
            warn!(column = col.name, source, "cast failed, filling nulls: {}", e);
            new_null_array(target, array.len())
        }
    }
}
