//! Econdata Library
//!
//! A Rust library for fetching public US business statistics into
//! typed, Snappy-compressed Parquet caches: Census Business Dynamics
//! Statistics, USDA ERS Urban Influence Codes, and county cartographic
//! boundaries.
//!
//! This library provides tools for:
//! - Downloading raw source files once and reusing them from disk
//! - Normalizing CSV, Excel workbook, and shapefile sources into typed
//!   DataFrames with stable column names and dtypes
//! - Caching normalized tables atomically with provenance sidecars
//! - Reporting cache state without touching the network

pub mod cache;
pub mod constants;
pub mod datasets;
pub mod download;
pub mod error;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use cache::{CacheMeta, CacheStatus};
pub use datasets::BdsGeo;
pub use download::DownloadOptions;
pub use error::{DataError, Result};
pub use store::DataStore;
