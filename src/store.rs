//! High-level dataset store.
//!
//! `DataStore` owns the data root and the HTTP client, and serves each
//! dataset with a download-or-cache flow: a cached Parquet file is read
//! back directly, otherwise the raw source is downloaded into the raw
//! directory, normalized, and cached before returning.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use reqwest::blocking::Client;
use tracing::info;

use crate::cache::{self, CacheStatus};
use crate::constants::{
    COUNTY_SHAPES_DATASET, COUNTY_SHAPES_EXTRACT_DIR, DEFAULT_DATA_DIR, RAW_SUBDIR, UIC_DATASET,
    UIC_RAW_FILENAME, parquet_filename, urls,
};
use crate::datasets::{BdsGeo, bds, shapes, uic};
use crate::download::{self, DownloadOptions};
use crate::error::Result;

/// Upstream URL of each dataset.
#[derive(Debug, Clone)]
struct SourceUrls {
    bds_nation: String,
    bds_state: String,
    bds_county: String,
    urban_influence: String,
    county_shapes: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            bds_nation: BdsGeo::Nation.url().to_string(),
            bds_state: BdsGeo::State.url().to_string(),
            bds_county: BdsGeo::County.url().to_string(),
            urban_influence: urls::URBAN_INFLUENCE.to_string(),
            county_shapes: urls::COUNTY_SHAPES.to_string(),
        }
    }
}

/// Store for cached statistical datasets.
#[derive(Debug)]
pub struct DataStore {
    root: PathBuf,
    client: Client,
    sources: SourceUrls,
}

impl DataStore {
    /// Create a store rooted at `root`. The directory does not need to
    /// exist yet; it is created on first use.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        // County-level files run to hundreds of megabytes, so no
        // request timeout.
        let client = Client::builder().timeout(None).build()?;

        Ok(Self {
            root: root.into(),
            client,
            sources: SourceUrls::default(),
        })
    }

    /// Store rooted at the conventional `data` directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_DATA_DIR)
    }

    /// Root directory holding the cached Parquet files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory raw downloads land in.
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(RAW_SUBDIR)
    }

    fn cache_path(&self, dataset: &str) -> PathBuf {
        self.root.join(parquet_filename(dataset))
    }

    fn bds_url(&self, geo: BdsGeo) -> &str {
        match geo {
            BdsGeo::Nation => &self.sources.bds_nation,
            BdsGeo::State => &self.sources.bds_state,
            BdsGeo::County => &self.sources.bds_county,
        }
    }

    /// Download a file with this store's HTTP client.
    ///
    /// An existing target is reused unless the options say otherwise,
    /// so repeated calls hit the network at most once.
    pub fn download_file(&self, url: &str, options: &DownloadOptions) -> Result<PathBuf> {
        download::download_file(&self.client, url, options)
    }

    /// Business Dynamics Statistics at the given geographic level.
    pub fn fetch_bds(&self, geo: BdsGeo) -> Result<DataFrame> {
        let dataset = geo.dataset();
        let cache_path = self.cache_path(&dataset);
        if cache_path.exists() {
            return cache::read_cache(&cache_path);
        }

        let url = self.bds_url(geo);
        info!("Fetching BDS {} series from {}", geo.as_str(), url);
        let options = DownloadOptions::new().with_dir(self.raw_dir());
        let raw_path = self.download_file(url, &options)?;

        let mut df = bds::dataframe_from_csv(&raw_path, geo)?;
        cache::write_cache(&mut df, &cache_path, &dataset, url)?;
        Ok(df)
    }

    /// US counties classified by the 2013 revision of the ERS Urban
    /// Influence Codes.
    pub fn fetch_urban_influence(&self) -> Result<DataFrame> {
        let cache_path = self.cache_path(UIC_DATASET);
        if cache_path.exists() {
            return cache::read_cache(&cache_path);
        }

        let url = &self.sources.urban_influence;
        info!("Fetching Urban Influence Codes from {}", url);
        let options = DownloadOptions::new()
            .with_dir(self.raw_dir())
            .with_file_name(UIC_RAW_FILENAME);
        let raw_path = self.download_file(url, &options)?;

        let mut df = uic::dataframe_from_workbook(&raw_path)?;
        cache::write_cache(&mut df, &cache_path, UIC_DATASET, url)?;
        Ok(df)
    }

    /// County boundary polygons with WKB geometry.
    pub fn fetch_county_shapes(&self) -> Result<DataFrame> {
        let cache_path = self.cache_path(COUNTY_SHAPES_DATASET);
        if cache_path.exists() {
            return cache::read_cache(&cache_path);
        }

        let url = &self.sources.county_shapes;
        info!("Fetching county boundaries from {}", url);
        let options = DownloadOptions::new().with_dir(self.raw_dir());
        let zip_path = self.download_file(url, &options)?;

        let extract_dir = self.raw_dir().join(COUNTY_SHAPES_EXTRACT_DIR);
        let mut df = shapes::dataframe_from_zip(&zip_path, &extract_dir)?;
        cache::write_cache(&mut df, &cache_path, COUNTY_SHAPES_DATASET, url)?;
        Ok(df)
    }

    /// Cache state of every supported dataset, without touching the
    /// network.
    pub fn cache_status(&self) -> Vec<CacheStatus> {
        let mut statuses = Vec::new();
        for geo in BdsGeo::ALL {
            let dataset = geo.dataset();
            statuses.push(cache::status_for(&self.cache_path(&dataset), &dataset));
        }
        statuses.push(cache::status_for(
            &self.cache_path(UIC_DATASET),
            UIC_DATASET,
        ));
        statuses.push(cache::status_for(
            &self.cache_path(COUNTY_SHAPES_DATASET),
            COUNTY_SHAPES_DATASET,
        ));
        statuses
    }
}
