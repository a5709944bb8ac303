//! Parquet cache layer for normalized datasets.
//!
//! Each dataset is cached as a single Snappy-compressed Parquet file
//! with a JSON metadata sidecar recording provenance and row count.
//! Writes are atomic: the file is written under a partial suffix, the
//! sidecar is persisted, and the rename into place commits the cache.
//! Cached files are trusted as-is and are never revalidated against
//! upstream.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::metadata_filename;
use crate::download::partial_path;
use crate::error::{DataError, Result};

/// Metadata sidecar for a cached dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub dataset: String,
    pub source_url: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub cached_at: DateTime<Utc>,
}

/// Cache state for a single dataset, suitable for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub dataset: String,
    pub cached: bool,
    pub rows: Option<usize>,
    pub cached_at: Option<DateTime<Utc>>,
}

/// Write a normalized DataFrame to the cache, replacing any previous
/// copy, and record its provenance in the metadata sidecar.
pub fn write_cache(df: &mut DataFrame, path: &Path, dataset: &str, source_url: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path);
    let file = fs::File::create(&partial)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(StatisticsOptions::full())
        .finish(df)
        .map_err(|e| {
            let _ = fs::remove_file(&partial);
            DataError::Polars(e)
        })?;

    // The sidecar goes in before the rename; the rename is the commit point.
    let meta = CacheMeta {
        dataset: dataset.to_string(),
        source_url: source_url.to_string(),
        rows: df.height(),
        columns: df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        cached_at: Utc::now(),
    };
    let serialized = serde_json::to_string_pretty(&meta).map_err(|e| {
        let _ = fs::remove_file(&partial);
        DataError::Metadata(e)
    })?;
    fs::write(meta_path(path), serialized).map_err(|e| {
        let _ = fs::remove_file(&partial);
        DataError::Io(e)
    })?;

    fs::rename(&partial, path).map_err(|e| {
        let _ = fs::remove_file(&partial);
        let _ = fs::remove_file(meta_path(path));
        DataError::Io(e)
    })?;

    debug!("Saved {} rows to cache {}", df.height(), path.display());
    Ok(())
}

/// Read a cached dataset back into a DataFrame.
pub fn read_cache(path: &Path) -> Result<DataFrame> {
    debug!("Read from cache {}", path.display());
    let file = fs::File::open(path)?;
    let df = ParquetReader::new(file).finish()?;
    Ok(df)
}

/// Read the metadata sidecar for a cached dataset, if present and valid.
pub fn read_meta(cache_path: &Path) -> Option<CacheMeta> {
    let content = fs::read_to_string(meta_path(cache_path)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Report the cache state for a dataset without touching the network.
pub fn status_for(cache_path: &Path, dataset: &str) -> CacheStatus {
    let meta = read_meta(cache_path);
    CacheStatus {
        dataset: dataset.to_string(),
        cached: cache_path.exists(),
        rows: meta.as_ref().map(|m| m.rows),
        cached_at: meta.map(|m| m.cached_at),
    }
}

/// Path of the metadata sidecar next to a cache file.
pub(crate) fn meta_path(cache_path: &Path) -> PathBuf {
    let stem = cache_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    cache_path.with_file_name(metadata_filename(stem))
}
