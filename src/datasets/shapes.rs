//! County boundary normalization.
//!
//! The Census cartographic boundary file ships as a zipped shapefile.
//! The archive is extracted next to the download, the polygons are
//! encoded as WKB in a binary `geometry` column, and the DBF
//! attributes are lowercased. `fips` duplicates `geoid`, which already
//! concatenates the state and county codes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geozero::{CoordDimensions, ToWkb};
use polars::prelude::*;
use shapefile::Shape;
use shapefile::dbase::{self, FieldValue};
use tracing::debug;
use ::zip::ZipArchive;

use crate::constants::columns;
use crate::error::{DataError, Result};

/// Extract the boundary archive and read it into the cached schema.
pub(crate) fn dataframe_from_zip(zip_path: &Path, extract_dir: &Path) -> Result<DataFrame> {
    extract_zip(zip_path, extract_dir)?;
    let shp_path = find_shp(extract_dir)?;
    dataframe_from_shapefile(&shp_path)
}

/// Extract every entry of a zip archive into `dest`, creating missing
/// directories. Existing files are overwritten.
pub(crate) fn extract_zip(zip_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    debug!(
        "Extracting {} entries from {} to {}",
        archive.len(),
        zip_path.display(),
        dest.display()
    );

    fs::create_dir_all(dest)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

/// Locate the shapefile inside an extracted archive.
fn find_shp(dir: &Path) -> Result<PathBuf> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("shp") {
            return Ok(path);
        }
    }

    Err(DataError::InvalidFormat {
        path: dir.to_path_buf(),
        reason: "no .shp file in extracted archive".to_string(),
    })
}

/// Read county polygons and attributes into a typed DataFrame.
///
/// County boundaries are polygons; any other shape type in the file is
/// an error. Attribute columns follow the 2013 cartographic boundary
/// layout, with the two area measures typed Int64.
pub(crate) fn dataframe_from_shapefile(path: &Path) -> Result<DataFrame> {
    let mut reader = shapefile::Reader::from_path(path)?;

    let mut statefp: Vec<Option<String>> = Vec::new();
    let mut countyfp: Vec<Option<String>> = Vec::new();
    let mut countyns: Vec<Option<String>> = Vec::new();
    let mut affgeoid: Vec<Option<String>> = Vec::new();
    let mut geoid: Vec<Option<String>> = Vec::new();
    let mut name: Vec<Option<String>> = Vec::new();
    let mut lsad: Vec<Option<String>> = Vec::new();
    let mut aland: Vec<Option<i64>> = Vec::new();
    let mut awater: Vec<Option<i64>> = Vec::new();
    let mut geometry: Vec<Vec<u8>> = Vec::new();
    let mut fips: Vec<Option<String>> = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let multi_polygon: geo_types::MultiPolygon<f64> = match shape {
            Shape::Polygon(polygon) => polygon.into(),
            other => {
                return Err(DataError::InvalidFormat {
                    path: path.to_path_buf(),
                    reason: format!("unexpected shape type {}", other.shapetype()),
                });
            }
        };
        let wkb =
            geo_types::Geometry::MultiPolygon(multi_polygon).to_wkb(CoordDimensions::xy())?;
        geometry.push(wkb);

        let geoid_value = field_str(&record, path, "GEOID")?;
        fips.push(geoid_value.clone());
        geoid.push(geoid_value);

        statefp.push(field_str(&record, path, "STATEFP")?);
        countyfp.push(field_str(&record, path, "COUNTYFP")?);
        countyns.push(field_str(&record, path, "COUNTYNS")?);
        affgeoid.push(field_str(&record, path, "AFFGEOID")?);
        name.push(field_str(&record, path, "NAME")?);
        lsad.push(field_str(&record, path, "LSAD")?);
        aland.push(field_i64(&record, path, "ALAND")?);
        awater.push(field_i64(&record, path, "AWATER")?);
    }

    let df = DataFrame::new(vec![
        Column::new("statefp".into(), statefp),
        Column::new("countyfp".into(), countyfp),
        Column::new("countyns".into(), countyns),
        Column::new("affgeoid".into(), affgeoid),
        Column::new(columns::GEOID.into(), geoid),
        Column::new("name".into(), name),
        Column::new("lsad".into(), lsad),
        Column::new(columns::ALAND.into(), aland),
        Column::new(columns::AWATER.into(), awater),
        Column::new(columns::GEOMETRY.into(), geometry),
        Column::new(columns::FIPS.into(), fips),
    ])?;

    Ok(df)
}

/// Text attribute from a DBF record.
fn field_str(record: &dbase::Record, path: &Path, field: &str) -> Result<Option<String>> {
    match record.get(field) {
        Some(FieldValue::Character(value)) => Ok(value.clone()),
        Some(other) => Err(DataError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("field {field} has unexpected type {other:?}"),
        }),
        None => Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: field.to_string(),
        }),
    }
}

/// Integer attribute from a DBF record.
fn field_i64(record: &dbase::Record, path: &Path, field: &str) -> Result<Option<i64>> {
    match record.get(field) {
        Some(FieldValue::Numeric(value)) => Ok(value.map(|v| v as i64)),
        Some(FieldValue::Integer(value)) => Ok(Some(*value as i64)),
        Some(FieldValue::Double(value)) => Ok(Some(*value as i64)),
        Some(other) => Err(DataError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("field {field} has unexpected type {other:?}"),
        }),
        None => Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::testutil::{write_county_shapefile, zip_files_bytes};

    #[test]
    fn test_shapefile_normalization() {
        let dir = TempDir::new().unwrap();
        let parts = write_county_shapefile(dir.path());

        let df = dataframe_from_shapefile(&parts[0]).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(
            df.get_column_names()
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>(),
            vec![
                "statefp", "countyfp", "countyns", "affgeoid", "geoid", "name", "lsad", "aland",
                "awater", "geometry", "fips"
            ]
        );

        assert_eq!(df.column("aland").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("geometry").unwrap().dtype(), &DataType::Binary);

        let fips = df.column("fips").unwrap().str().unwrap();
        assert_eq!(fips.get(0), Some("01001"));

        let aland = df.column("aland").unwrap().i64().unwrap();
        assert_eq!(aland.get(0), Some(1539582278));
    }

    #[test]
    fn test_geometry_is_little_endian_multipolygon_wkb() {
        let dir = TempDir::new().unwrap();
        let parts = write_county_shapefile(dir.path());

        let df = dataframe_from_shapefile(&parts[0]).unwrap();
        let geometry = df.column("geometry").unwrap().binary().unwrap();
        let wkb = geometry.get(0).unwrap();

        // Byte order marker, then geometry type 6 (MultiPolygon)
        assert_eq!(wkb[0], 1);
        assert_eq!(u32::from_le_bytes([wkb[1], wkb[2], wkb[3], wkb[4]]), 6);
    }

    #[test]
    fn test_zip_extraction_and_read() {
        let dir = TempDir::new().unwrap();
        let shp_dir = dir.path().join("source");
        fs::create_dir_all(&shp_dir).unwrap();
        let parts = write_county_shapefile(&shp_dir);

        let zip_path = dir.path().join("cb_2013_us_county_20m.zip");
        fs::write(&zip_path, zip_files_bytes(&parts)).unwrap();

        let extract_dir = dir.path().join("extracted");
        let df = dataframe_from_zip(&zip_path, &extract_dir).unwrap();

        assert_eq!(df.height(), 1);
        assert!(extract_dir.join("cb_2013_us_county_20m.shp").exists());

        // Re-running over the existing extraction is fine
        let again = dataframe_from_zip(&zip_path, &extract_dir).unwrap();
        assert_eq!(again.height(), 1);
    }

    #[test]
    fn test_missing_shp_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = find_shp(dir.path());
        assert!(matches!(result, Err(DataError::InvalidFormat { .. })));
    }
}
