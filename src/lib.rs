pub mod config;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod plan;
pub mod schema;
pub mod sink;
