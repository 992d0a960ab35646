// src/schema/canonical.rs

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const VENDOR_ID: &str = "vendor_id";
pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
pub const DROPOFF_DATETIME: &str = "tpep_dropoff_datetime";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const TRIP_DISTANCE: &str = "trip_distance";
pub const PU_LOCATION_ID: &str = "pulocationid";
pub const DO_LOCATION_ID: &str = "dolocationid";
pub const PAYMENT_TYPE: &str = "payment_type";
pub const FARE_AMOUNT: &str = "fare_amount";
pub const EXTRACTED_AT: &str = "extracted_at";

/// Timezone carried by the `extracted_at` column.
pub const EXTRACTED_AT_TZ: &str = "UTC";

/// A declared business column: name plus the Arrow type it is delivered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalColumn {
    pub name: &'static str,
    pub ty: ColumnKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Timestamp,
}

impl ColumnKind {
    pub fn data_type(self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }
}

/// The nine business columns, in output order. `extracted_at` follows them.
pub const BUSINESS_COLUMNS: [CanonicalColumn; 9] = [
    CanonicalColumn { name: VENDOR_ID, ty: ColumnKind::Integer },
    CanonicalColumn { name: PICKUP_DATETIME, ty: ColumnKind::Timestamp },
    CanonicalColumn { name: DROPOFF_DATETIME, ty: ColumnKind::Timestamp },
    CanonicalColumn { name: PASSENGER_COUNT, ty: ColumnKind::Integer },
    CanonicalColumn { name: TRIP_DISTANCE, ty: ColumnKind::Float },
    CanonicalColumn { name: PU_LOCATION_ID, ty: ColumnKind::Integer },
    CanonicalColumn { name: DO_LOCATION_ID, ty: ColumnKind::Integer },
    CanonicalColumn { name: PAYMENT_TYPE, ty: ColumnKind::Integer },
    CanonicalColumn { name: FARE_AMOUNT, ty: ColumnKind::Float },
];

pub fn extracted_at_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some(Arc::from(EXTRACTED_AT_TZ)))
}

static CANONICAL_SCHEMA: Lazy<SchemaRef> = Lazy::new(|| {
    let mut fields: Vec<Field> = BUSINESS_COLUMNS
        .iter()
        .map(|col| Field::new(col.name, col.ty.data_type(), /* nullable = */ true))
        .collect();
    fields.push(Field::new(EXTRACTED_AT, extracted_at_type(), true));
    Arc::new(Schema::new(fields))
});

/// The output schema every normalized and assembled table carries.
pub fn canonical_schema() -> SchemaRef {
    CANONICAL_SCHEMA.clone()
}

/// Column names of the output schema, in order.
pub fn canonical_column_names() -> Vec<&'static str> {
    BUSINESS_COLUMNS
        .iter()
        .map(|c| c.name)
        .chain(std::iter::once(EXTRACTED_AT))
        .collect()
}
