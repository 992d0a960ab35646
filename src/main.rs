use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use tripscraper::{
    config::{RunConfig, Settings},
    fetch::{Fetcher, HttpFetcher, LocalFetcher, SourceLocator},
    ingest::{IngestReport, Ingestor},
    logging,
    sink,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();
    info!("startup");

    // ─── 2) resolve configuration; malformed values abort here ───────
    let settings = Settings::from_env().context("reading settings")?;
    let today = Utc::now().date_naive();
    let config = RunConfig::from_env(today).context("reading run configuration")?;
    info!(
        from = %config.window.first_month(),
        to = %config.window.last_month(),
        categories = ?config.categories,
        base = %settings.base_url,
        "configured"
    );

    // ─── 3) ingest ───────────────────────────────────────────────────
    let locator = SourceLocator::new(settings.base_url.clone());
    let report = if locator.is_remote() {
        let fetcher = HttpFetcher::new(settings.fetch_timeout)?;
        ingest(locator, fetcher, &config).await?
    } else {
        ingest(locator, LocalFetcher, &config).await?
    };

    if report.fetched.is_empty() {
        warn!("no unit could be fetched; writing an empty table");
    }

    // ─── 4) materialize ──────────────────────────────────────────────
    let path = sink::write_parquet(&report.table, &settings.output_dir)?;
    info!(
        path = %path.display(),
        rows = report.table.num_rows(),
        fetched = report.fetched.len(),
        skipped = report.skipped.len(),
        "all done"
    );
    Ok(())
}

async fn ingest<F: Fetcher>(
    locator: SourceLocator,
    fetcher: F,
    config: &RunConfig,
) -> Result<IngestReport> {
    Ingestor::new(locator, fetcher).run(config).await
}
