// src/ingest/mod.rs

use anyhow::Result;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::RunConfig;
use crate::fetch::{FetchError, Fetcher, SourceLocator};
use crate::plan::{plan_units, FetchUnit};
use crate::schema::normalize;

pub mod assemble;

pub use assemble::assemble;

/// A unit that contributed no rows, with the reason.
#[derive(Debug)]
pub struct SkippedUnit {
    pub unit: FetchUnit,
    pub id: String,
    pub reason: FetchError,
}

/// Result of one run: the assembled table plus per-unit bookkeeping.
#[derive(Debug)]
pub struct IngestReport {
    pub table: RecordBatch,
    pub fetched: Vec<FetchUnit>,
    pub skipped: Vec<SkippedUnit>,
}

/// Projects a raw table onto the output schema, stamping the given instant.
pub type Normalizer = fn(&RecordBatch, DateTime<Utc>) -> Result<RecordBatch>;

/// Walks every (category, month) unit, fetching one at a time and skipping
/// whatever fails.
pub struct Ingestor<F> {
    locator: SourceLocator,
    fetcher: F,
    clock: fn() -> DateTime<Utc>,
    normalizer: Normalizer,
}

impl<F: Fetcher> Ingestor<F> {
    pub fn new(locator: SourceLocator, fetcher: F) -> Self {
        Self {
            locator,
            fetcher,
            clock: Utc::now,
            normalizer: normalize,
        }
    }

    /// Replace the source of `extracted_at` stamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the per-unit normalization step.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// Fetch, normalize and assemble everything `config` asks for.
    #[instrument(level = "info", skip_all, fields(categories = ?config.categories))]
    pub async fn run(&self, config: &RunConfig) -> Result<IngestReport> {
        let start = Instant::now();
        let mut tables = Vec::new();
        let mut fetched = Vec::new();
        let mut skipped = Vec::new();

        for unit in plan_units(&config.categories, &config.window) {
            let id = self.locator.locate(&unit);
            match self.fetch_unit(&id).await {
                Ok(table) => {
                    info!(unit = %unit, rows = table.num_rows(), "fetched");
                    tables.push(table);
                    fetched.push(unit);
                }
                Err(reason) => {
                    warn!(unit = %unit, kind = reason.kind(), "skipping: {}", reason);
                    skipped.push(SkippedUnit { unit, id, reason });
                }
            }
        }

        let table = assemble(&tables)?;
        info!(
            rows = table.num_rows(),
            fetched = fetched.len(),
            skipped = skipped.len(),
            elapsed = ?start.elapsed(),
            "ingest complete"
        );

        Ok(IngestReport {
            table,
            fetched,
            skipped,
        })
    }

    /// Fetch and normalize one unit. Normalization failures are reported
    /// like fetch failures so the unit is skipped, not the run.
    async fn fetch_unit(&self, id: &str) -> Result<RecordBatch, FetchError> {
        let raw = self.fetcher.fetch(id).await?;
        (self.normalizer)(&raw, (self.clock)()).map_err(|e| FetchError::Normalize {
            id: id.to_string(),
            reason: format!("{:#}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::IngestionWindow;
    use crate::schema::canonical_column_names;
    use arrow::array::{Array, ArrayRef, Int64Array, StringArray, TimestampMicrosecondArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use chrono::{NaiveDate, TimeZone};
    use std::{collections::HashMap, sync::Arc, sync::Mutex};

    /// Serves canned tables by identifier and records every request.
    #[derive(Default)]
    struct StubFetcher {
        tables: HashMap<String, RecordBatch>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn serve(mut self, id: &str, batch: RecordBatch) -> Self {
            self.tables.insert(id.to_string(), batch);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetcher for StubFetcher {
        async fn fetch(&self, id: &str) -> Result<RecordBatch, FetchError> {
            self.calls.lock().unwrap().push(id.to_string());
            self.tables
                .get(id)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(id.to_string()))
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 30, 0).unwrap()
    }

    fn id(category: &str, ym: &str) -> String {
        format!(
            "https://d37ci6vzurychx.cloudfront.net/trip-data/{}_tripdata_{}.parquet",
            category, ym
        )
    }

    fn aliased_batch(vendors: Vec<i64>) -> RecordBatch {
        let pickups: Vec<String> = (0..vendors.len())
            .map(|i| format!("2023-01-01 00:{:02}:00", i))
            .collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("VendorID", DataType::Int64, true),
            Field::new("pickup_datetime", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vendors)) as ArrayRef,
                Arc::new(StringArray::from(pickups)) as ArrayRef,
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn single_month_with_aliased_columns() -> Result<()> {
        let fetcher = StubFetcher::default().serve(&id("yellow", "2023-01"), aliased_batch(vec![1, 2, 1]));
        let ingestor = Ingestor::new(SourceLocator::default(), fetcher).with_clock(fixed_clock);
        let config = RunConfig::new(
            IngestionWindow::new(d(2023, 1, 1), d(2023, 1, 31)),
            vec!["yellow".to_string()],
        );

        let report = ingestor.run(&config).await?;
        let out = &report.table;

        assert_eq!(out.num_rows(), 3);
        let schema = out.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, canonical_column_names());

        let vendor = out.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(vendor.values().to_vec(), vec![1, 2, 1]);
        assert_eq!(out.column(1).null_count(), 0);
        for i in 2..9 {
            assert_eq!(out.column(i).null_count(), 3, "column {}", names[i]);
        }
        let stamp = out
            .column(9)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .unwrap();
        assert!(stamp.iter().all(|v| v == Some(fixed_clock().timestamp_micros())));

        assert_eq!(report.fetched.len(), 1);
        assert!(report.skipped.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn all_failures_yield_empty_canonical_table() -> Result<()> {
        let ingestor = Ingestor::new(SourceLocator::default(), StubFetcher::default());
        let config = RunConfig::new(
            IngestionWindow::new(d(2023, 1, 1), d(2023, 3, 1)),
            vec!["yellow".to_string(), "fhv".to_string()],
        );

        let report = ingestor.run(&config).await?;
        assert_eq!(report.table.num_rows(), 0);
        assert_eq!(report.table.num_columns(), 10);
        assert_eq!(report.skipped.len(), 6);
        assert!(report.skipped.iter().all(|s| s.reason.kind() == "not_found"));
        Ok(())
    }

    #[tokio::test]
    async fn fetches_in_category_major_order_and_skips_gaps() -> Result<()> {
        let fetcher = StubFetcher::default()
            .serve(&id("yellow", "2023-02"), aliased_batch(vec![20]))
            .serve(&id("fhv", "2023-01"), aliased_batch(vec![30, 31]))
            .serve(&id("yellow", "2023-01"), aliased_batch(vec![10]));
        let ingestor = Ingestor::new(SourceLocator::default(), fetcher);
        let config = RunConfig::new(
            IngestionWindow::new(d(2023, 1, 9), d(2023, 2, 2)),
            vec!["yellow".to_string(), "fhv".to_string()],
        );

        let report = ingestor.run(&config).await?;
        assert_eq!(
            ingestor.fetcher.calls(),
            vec![
                id("yellow", "2023-01"),
                id("yellow", "2023-02"),
                id("fhv", "2023-01"),
                id("fhv", "2023-02"),
            ]
        );

        let vendor = report
            .table
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(vendor.values().to_vec(), vec![10, 20, 30, 31]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].unit.to_string(), "fhv/2023-02");
        Ok(())
    }

    #[tokio::test]
    async fn default_config_plans_current_month_only() -> Result<()> {
        let ingestor = Ingestor::new(SourceLocator::default(), StubFetcher::default());
        let config = RunConfig::default_for(d(2024, 6, 15));

        let report = ingestor.run(&config).await?;
        assert_eq!(ingestor.fetcher.calls(), vec![id("yellow", "2024-06")]);
        assert_eq!(report.skipped.len(), 1);
        Ok(())
    }

    fn reject_vendor_two(raw: &RecordBatch, at: DateTime<Utc>) -> Result<RecordBatch> {
        let vendors = raw.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        if vendors.values().contains(&2) {
            anyhow::bail!("vendor 2 not accepted");
        }
        normalize(raw, at)
    }

    #[tokio::test]
    async fn normalization_failure_skips_only_that_unit() -> Result<()> {
        let fetcher = StubFetcher::default()
            .serve(&id("yellow", "2023-01"), aliased_batch(vec![1]))
            .serve(&id("yellow", "2023-02"), aliased_batch(vec![2, 2]))
            .serve(&id("yellow", "2023-03"), aliased_batch(vec![3]));
        let ingestor =
            Ingestor::new(SourceLocator::default(), fetcher).with_normalizer(reject_vendor_two);
        let config = RunConfig::new(
            IngestionWindow::new(d(2023, 1, 1), d(2023, 3, 1)),
            vec!["yellow".to_string()],
        );

        let report = ingestor.run(&config).await?;
        let vendor = report
            .table
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(vendor.values().to_vec(), vec![1, 3]);
        assert_eq!(report.fetched.len(), 2);
        assert_eq!(report.skipped.len(), 1);

        let skipped = &report.skipped[0];
        assert_eq!(skipped.unit.to_string(), "yellow/2023-02");
        assert_eq!(skipped.reason.kind(), "normalize");
        assert!(skipped.reason.to_string().contains("vendor 2 not accepted"));
        Ok(())
    }
}
