// src/fetch/mod.rs

use arrow::{compute::concat_batches, error::ArrowError, record_batch::RecordBatch};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use parquet::file::reader::ChunkReader;
use std::{io, path::PathBuf};
use thiserror::Error;

pub mod http;
pub mod local;
pub mod locator;

pub use http::HttpFetcher;
pub use local::LocalFetcher;
pub use locator::SourceLocator;

const READ_BATCH_SIZE: usize = 64 * 1024;

/// Why a single unit could not be fetched. The orchestrator skips the unit
/// for every variant; the variant only feeds logging.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decoding parquet {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: ParquetError,
    },

    #[error("reading batches from {id}: {source}")]
    Arrow {
        id: String,
        #[source]
        source: ArrowError,
    },

    #[error("invalid location {id}: {reason}")]
    InvalidLocation { id: String, reason: String },

    #[error("normalizing {id}: {reason}")]
    Normalize { id: String, reason: String },
}

impl FetchError {
    /// Short, stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "not_found",
            FetchError::Http { .. } => "http",
            FetchError::Transport { .. } => "transport",
            FetchError::Io { .. } => "io",
            FetchError::Decode { .. } | FetchError::Arrow { .. } => "decode",
            FetchError::InvalidLocation { .. } => "invalid_location",
            FetchError::Normalize { .. } => "normalize",
        }
    }
}

/// Turns a resource identifier into a raw trip table.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, id: &str) -> Result<RecordBatch, FetchError>;
}

/// Decode a whole parquet object into one batch, row groups in file order.
pub fn read_parquet<T: ChunkReader + 'static>(id: &str, data: T) -> Result<RecordBatch, FetchError> {
    let decode = |source| FetchError::Decode {
        id: id.to_string(),
        source,
    };
    let arrow = |source| FetchError::Arrow {
        id: id.to_string(),
        source,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(data).map_err(decode)?;
    let schema = builder.schema().clone();
    let reader = builder
        .with_batch_size(READ_BATCH_SIZE)
        .build()
        .map_err(decode)?;
    let batches = reader.collect::<Result<Vec<_>, _>>().map_err(arrow)?;
    concat_batches(&schema, &batches).map_err(arrow)
}
