//! Error handling for dataset download and cache operations.
//!
//! Provides error types with context for network transfers, archive
//! extraction, worksheet parsing, and columnar conversion failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid download URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Excel workbook error: {0}")]
    Workbook(#[from] calamine::XlsError),

    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("Geometry encoding error: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("Cache metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Missing column {column} in source file: {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid source format in file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, DataError>;
