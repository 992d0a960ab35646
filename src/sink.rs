// src/sink.rs

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::info;

const FILE_PREFIX: &str = "trips";

/// Append `batch` to `dir` as a new parquet file and return its path.
///
/// Written to a `.tmp` sibling first and renamed into place, so readers
/// globbing `*.parquet` never see a half-written file. Empty batches are
/// still written to carry the schema.
pub fn write_parquet(batch: &RecordBatch, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("could not create `{}`", dir.display()))?;

    let ts = Utc::now().timestamp_micros();
    let final_path = dir.join(format!("{}-{}.parquet", FILE_PREFIX, ts));
    let tmp_path = final_path.with_extension("parquet.tmp");

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(3)?))
        .set_dictionary_enabled(true)
        .build();

    let file = File::create(&tmp_path)
        .with_context(|| format!("creating `{}`", tmp_path.display()))?;
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    fs::rename(&tmp_path, &final_path).with_context(|| {
        format!(
            "renaming `{}` -> `{}`",
            tmp_path.display(),
            final_path.display()
        )
    })?;

    info!(path = %final_path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(final_path)
}
