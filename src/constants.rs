//! Application constants for dataset sources and cache layout.
//!
//! This module contains the upstream download URLs, cache directory
//! layout, and column name mappings used throughout the crate.

// =============================================================================
// Upstream Dataset URLs
// =============================================================================

/// Source URLs for the supported datasets.
///
/// The Census Bureau publishes Business Dynamics Statistics as one CSV
/// per geographic level, revised annually. The 2021 vintage is pinned
/// here so cached files stay comparable across runs.
pub mod urls {
    /// BDS time series, national aggregate.
    pub const BDS_NATION: &str =
        "https://www2.census.gov/programs-surveys/bds/tables/time-series/2021/bds2021.csv";

    /// BDS time series by state.
    pub const BDS_STATE: &str =
        "https://www2.census.gov/programs-surveys/bds/tables/time-series/2021/bds2021_st.csv";

    /// BDS time series by state and county.
    pub const BDS_COUNTY: &str =
        "https://www2.census.gov/programs-surveys/bds/tables/time-series/2021/bds2021_st_cty.csv";

    /// USDA ERS Urban Influence Codes, 2013 revision.
    pub const URBAN_INFLUENCE: &str =
        "https://www.ers.usda.gov/webdocs/DataFiles/53797/UrbanInfluenceCodes2013.xls?v=4919.6";

    /// Census cartographic boundary counties, 2013 vintage, 1:20m resolution.
    pub const COUNTY_SHAPES: &str =
        "https://www2.census.gov/geo/tiger/GENZ2013/cb_2013_us_county_20m.zip";
}

// =============================================================================
// File and Directory Constants
// =============================================================================

/// Default root directory for cached datasets
pub const DEFAULT_DATA_DIR: &str = "data";

/// Subdirectory of the data root holding raw downloads
pub const RAW_SUBDIR: &str = "raw";

/// Cache file stem for the Urban Influence Codes table
pub const UIC_DATASET: &str = "uic";

/// Cache file stem for the county boundaries table
pub const COUNTY_SHAPES_DATASET: &str = "county_shp";

/// Raw filename for the Urban Influence workbook.
///
/// The ERS download URL carries a query string, so the filename cannot
/// be taken from the URL path directly.
pub const UIC_RAW_FILENAME: &str = "UrbanInfluenceCodes2013.xls";

/// Directory name (under the raw directory) for extracted boundary shapefiles
pub const COUNTY_SHAPES_EXTRACT_DIR: &str = "cb_2013_us_county_20m";

/// Suffix for in-progress downloads and cache writes
pub const PARTIAL_SUFFIX: &str = ".part";

// =============================================================================
// CSV Parsing Constants
// =============================================================================

/// Suppression markers used in BDS CSV files.
///
/// The Census Bureau publishes `D` (withheld for disclosure avoidance),
/// `S` (suppressed for data quality), and `N` (not available) in place
/// of numeric values. All three map to null.
pub const BDS_NULL_VALUES: &[&str] = &["S", "D", "N"];

/// Rows to scan when inferring CSV column types
pub const CSV_INFER_SCHEMA_LENGTH: usize = 10_000;

// =============================================================================
// Column Name Constants
// =============================================================================

/// Standard column names in the cached datasets
pub mod columns {
    // Geographic identifier columns
    pub const FIPS: &str = "fips";
    pub const ST: &str = "st";
    pub const CTY: &str = "cty";
    pub const GEOID: &str = "geoid";

    // BDS temporal column
    pub const YEAR: &str = "year";

    // Urban Influence columns
    pub const STATE_ABBR: &str = "state_abbr";
    pub const COUNTY_NAME: &str = "county_name";
    pub const POPULATION: &str = "population";
    pub const UIC: &str = "uic";
    pub const UIC_DESC: &str = "uic_desc";

    // County boundary columns
    pub const GEOMETRY: &str = "geometry";
    pub const ALAND: &str = "aland";
    pub const AWATER: &str = "awater";
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the cache filename for a dataset stem
pub fn parquet_filename(dataset: &str) -> String {
    format!("{}.parquet", dataset)
}

/// Get the metadata sidecar filename for a dataset stem
pub fn metadata_filename(dataset: &str) -> String {
    format!("{}.metadata.json", dataset)
}
