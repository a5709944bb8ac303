//! Urban Influence Codes normalization.
//!
//! The ERS classification arrives as a legacy `.xls` workbook with one
//! row per county. Headers are lowercased and renamed to the cached
//! schema: `fips`, `state_abbr`, `county_name`, `population` (Int32),
//! `uic` (Int8), `uic_desc`. Rows without a FIPS code (blank separators
//! and trailing notes) are dropped.

use std::path::Path;

use calamine::{Data, Range, Reader, Xls, open_workbook};
use polars::prelude::*;

use crate::constants::columns;
use crate::error::{DataError, Result};

/// Read the Urban Influence workbook into a typed DataFrame.
pub(crate) fn dataframe_from_workbook(path: &Path) -> Result<DataFrame> {
    let mut workbook: Xls<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "workbook has no worksheets".to_string(),
        })??;

    dataframe_from_range(&range, path)
}

/// Convert the first worksheet into the cached schema.
///
/// The header row is matched case-insensitively against the 2013
/// revision's column names.
fn dataframe_from_range(range: &Range<Data>, path: &Path) -> Result<DataFrame> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| DataError::InvalidFormat {
        path: path.to_path_buf(),
        reason: "worksheet is empty".to_string(),
    })?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_str(cell).unwrap_or_default().to_lowercase())
        .collect();
    let column_index = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| DataError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };

    let fips_idx = column_index("fips")?;
    let state_idx = column_index("state")?;
    let county_idx = column_index("county_name")?;
    let population_idx = column_index("population_2010")?;
    let uic_idx = column_index("uic_2013")?;
    let desc_idx = column_index("description")?;

    let mut fips: Vec<Option<String>> = Vec::new();
    let mut state_abbr: Vec<Option<String>> = Vec::new();
    let mut county_name: Vec<Option<String>> = Vec::new();
    let mut population: Vec<Option<i32>> = Vec::new();
    let mut uic: Vec<Option<i8>> = Vec::new();
    let mut uic_desc: Vec<Option<String>> = Vec::new();

    for row in rows {
        let Some(code) = row.get(fips_idx).and_then(cell_str) else {
            continue;
        };

        fips.push(Some(code));
        state_abbr.push(row.get(state_idx).and_then(cell_str));
        county_name.push(row.get(county_idx).and_then(cell_str));
        population.push(
            row.get(population_idx)
                .and_then(cell_i64)
                .map(|v| v as i32),
        );
        uic.push(row.get(uic_idx).and_then(cell_i64).map(|v| v as i8));
        uic_desc.push(row.get(desc_idx).and_then(cell_str));
    }

    let df = DataFrame::new(vec![
        Column::new(columns::FIPS.into(), fips),
        Column::new(columns::STATE_ABBR.into(), state_abbr),
        Column::new(columns::COUNTY_NAME.into(), county_name),
        Column::new(columns::POPULATION.into(), population),
        Column::new(columns::UIC.into(), uic),
        Column::new(columns::UIC_DESC.into(), uic_desc),
    ])?;

    Ok(df)
}

/// Text content of a cell, None when empty.
fn cell_str(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer content of a cell, tolerating text cells with separators.
fn cell_i64(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => Some(*f as i64),
        Data::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .map(|f| f as i64),
        _ => None,
    }
}
