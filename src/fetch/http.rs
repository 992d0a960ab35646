// src/fetch/http.rs

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use super::{read_parquet, FetchError, Fetcher};

/// Downloads a parquet object over HTTP(S) and decodes it in memory.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// `timeout` bounds each request end to end.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, id: &str) -> Result<RecordBatch, FetchError> {
        let url = Url::parse(id).map_err(|e| FetchError::InvalidLocation {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        let start = Instant::now();
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: id.to_string(),
                source,
            })?;

        match resp.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound(id.to_string())),
            status => {
                return Err(FetchError::Http {
                    url: id.to_string(),
                    status: status.as_u16(),
                })
            }
        }

        let bytes = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: id.to_string(),
            source,
        })?;
        debug!(url = %url, bytes = bytes.len(), elapsed = ?start.elapsed(), "downloaded");

        read_parquet(id, bytes)
    }
}
