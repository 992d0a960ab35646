pub mod alias;
pub mod canonical;
pub mod normalize;

pub use alias::COLUMN_ALIASES;
pub use canonical::{canonical_column_names, canonical_schema, BUSINESS_COLUMNS};
pub use normalize::normalize;
