// src/fetch/local.rs

use arrow::record_batch::RecordBatch;
use std::{fs::File, io, path::PathBuf};
use tokio::task;

use super::{read_parquet, FetchError, Fetcher};

/// Reads parquet files from a local mirror. Identifiers are paths,
/// optionally prefixed with `file://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl Fetcher for LocalFetcher {
    async fn fetch(&self, id: &str) -> Result<RecordBatch, FetchError> {
        let path = PathBuf::from(id.strip_prefix("file://").unwrap_or(id));
        let id = id.to_string();

        let worker_path = path.clone();
        task::spawn_blocking(move || {
            let file = File::open(&worker_path).map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    FetchError::NotFound(id.clone())
                } else {
                    FetchError::Io {
                        path: worker_path.clone(),
                        source,
                    }
                }
            })?;
            read_parquet(&id, file)
        })
        .await
        .map_err(|e| FetchError::Io {
            path,
            source: io::Error::new(io::ErrorKind::Other, e),
        })?
    }
}
