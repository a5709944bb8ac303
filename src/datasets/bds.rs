//! Business Dynamics Statistics normalization.
//!
//! The Census Bureau publishes BDS as one CSV per geographic level.
//! Measures are establishment and job-flow counts typed Int32, rates
//! typed Float32, and `year` typed Int16. State and county codes are
//! read as strings so FIPS leading zeros survive, and county rows gain
//! a combined `fips` column.

use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{BDS_NULL_VALUES, CSV_INFER_SCHEMA_LENGTH, columns, urls};
use crate::error::Result;

/// Geographic level of a BDS time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BdsGeo {
    Nation,
    State,
    County,
}

impl BdsGeo {
    /// All supported geographic levels.
    pub const ALL: [BdsGeo; 3] = [BdsGeo::Nation, BdsGeo::State, BdsGeo::County];

    /// Lowercase name used in cache filenames and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            BdsGeo::Nation => "nation",
            BdsGeo::State => "state",
            BdsGeo::County => "county",
        }
    }

    /// Upstream CSV for this geographic level.
    pub fn url(&self) -> &'static str {
        match self {
            BdsGeo::Nation => urls::BDS_NATION,
            BdsGeo::State => urls::BDS_STATE,
            BdsGeo::County => urls::BDS_COUNTY,
        }
    }

    /// Cache file stem, e.g. `bds_county`.
    pub fn dataset(&self) -> String {
        format!("bds_{}", self.as_str())
    }

    /// Columns that must stay strings so leading zeros survive.
    fn string_columns(&self) -> &'static [&'static str] {
        match self {
            BdsGeo::Nation => &[],
            BdsGeo::State => &[columns::ST],
            BdsGeo::County => &[columns::ST, columns::CTY],
        }
    }
}

/// Measure columns published as percentage rates.
const RATE_COLUMNS: &[&str] = &[
    "estabs_entry_rate",
    "estabs_exit_rate",
    "job_creation_rate_births",
    "job_creation_rate",
    "job_destruction_rate_deaths",
    "job_destruction_rate",
    "net_job_creation_rate",
    "reallocation_rate",
];

/// Cached dtype for a raw BDS column.
///
/// Measures default to Int32 counts; the rate list carries the Float32
/// exceptions. Returns None for columns that stay as read.
fn target_dtype(name: &str) -> Option<DataType> {
    match name {
        columns::YEAR => Some(DataType::Int16),
        columns::ST | columns::CTY => None,
        _ if RATE_COLUMNS.contains(&name) => Some(DataType::Float32),
        _ => Some(DataType::Int32),
    }
}

/// Read a raw BDS CSV into a typed DataFrame.
///
/// Suppression markers (`S`, `D`, `N`) map to null in every column.
pub(crate) fn dataframe_from_csv(path: &Path, geo: BdsGeo) -> Result<DataFrame> {
    let string_overrides = Schema::from_iter(
        geo.string_columns()
            .iter()
            .map(|name| Field::new((*name).into(), DataType::String)),
    );

    let null_markers: Vec<PlSmallStr> = BDS_NULL_VALUES.iter().map(|v| (*v).into()).collect();
    let parse_options =
        CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_markers)));

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(CSV_INFER_SCHEMA_LENGTH))
        .with_schema_overwrite(Some(Arc::new(string_overrides)))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for name in &names {
        let Some(dtype) = target_dtype(name) else {
            continue;
        };
        if df.column(name)?.dtype() == &dtype {
            continue;
        }
        let cast = df.column(name)?.cast(&dtype)?;
        df.with_column(cast)?;
    }

    if geo == BdsGeo::County {
        let fips = county_fips(&df)?;
        df.with_column(fips)?;
    }

    Ok(df)
}

/// Combined state and county FIPS code, null when either part is null.
fn county_fips(df: &DataFrame) -> Result<Series> {
    let st = df.column(columns::ST)?.str()?;
    let cty = df.column(columns::CTY)?.str()?;

    let fips: StringChunked = st
        .into_iter()
        .zip(cty)
        .map(|(st, cty)| match (st, cty) {
            (Some(st), Some(cty)) => Some(format!("{st}{cty}")),
            _ => None,
        })
        .collect();

    Ok(fips.with_name(columns::FIPS.into()).into_series())
}
