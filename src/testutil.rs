//! Fixture builders shared across module tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use shapefile::dbase::{self, FieldValue, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};
use zip::write::{FileOptions, ZipWriter};

/// Raw CSV shaped like the county-level BDS file, small enough to
/// assert against by hand. Row three carries suppression markers.
pub(crate) fn bds_county_csv() -> String {
    "year,st,cty,firms,estabs,emp,estabs_entry_rate\n\
     2019,01,001,912,1016,12767,8.2\n\
     2020,01,001,920,1025,12950,7.9\n\
     2021,01,001,D,S,N,7.5\n\
     2019,56,045,210,260,3405,6.1\n"
        .to_string()
}

/// Write a one-county shapefile shaped like the cartographic boundary
/// layout and return the paths of its three parts.
pub(crate) fn write_county_shapefile(dir: &Path) -> Vec<PathBuf> {
    let table = TableWriterBuilder::new()
        .add_character_field("STATEFP".try_into().unwrap(), 2)
        .add_character_field("COUNTYFP".try_into().unwrap(), 3)
        .add_character_field("COUNTYNS".try_into().unwrap(), 8)
        .add_character_field("AFFGEOID".try_into().unwrap(), 20)
        .add_character_field("GEOID".try_into().unwrap(), 5)
        .add_character_field("NAME".try_into().unwrap(), 30)
        .add_character_field("LSAD".try_into().unwrap(), 2)
        .add_numeric_field("ALAND".try_into().unwrap(), 14, 0)
        .add_numeric_field("AWATER".try_into().unwrap(), 14, 0);

    let shp_path = dir.join("cb_2013_us_county_20m.shp");
    let mut writer = Writer::from_path(&shp_path, table).unwrap();

    let ring = PolygonRing::Outer(vec![
        Point::new(-86.9, 32.3),
        Point::new(-86.9, 32.7),
        Point::new(-86.4, 32.7),
        Point::new(-86.4, 32.3),
        Point::new(-86.9, 32.3),
    ]);
    let polygon = Polygon::new(ring);

    let mut record = dbase::Record::default();
    record.insert("STATEFP".to_string(), character("01"));
    record.insert("COUNTYFP".to_string(), character("001"));
    record.insert("COUNTYNS".to_string(), character("00161526"));
    record.insert("AFFGEOID".to_string(), character("0500000US01001"));
    record.insert("GEOID".to_string(), character("01001"));
    record.insert("NAME".to_string(), character("Autauga"));
    record.insert("LSAD".to_string(), character("06"));
    record.insert("ALAND".to_string(), FieldValue::Numeric(Some(1539582278.0)));
    record.insert("AWATER".to_string(), FieldValue::Numeric(Some(25775735.0)));

    writer.write_shape_and_record(&polygon, &record).unwrap();
    drop(writer);

    vec![
        shp_path,
        dir.join("cb_2013_us_county_20m.shx"),
        dir.join("cb_2013_us_county_20m.dbf"),
    ]
}

fn character(value: &str) -> FieldValue {
    FieldValue::Character(Some(value.to_string()))
}

/// Zip existing files into a flat in-memory archive.
pub(crate) fn zip_files_bytes(files: &[PathBuf]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        let entry_name = file.file_name().unwrap().to_str().unwrap().to_string();
        zip.start_file::<_, ()>(entry_name, FileOptions::default())
            .unwrap();
        zip.write_all(&fs::read(file).unwrap()).unwrap();
    }
    let cursor = zip.finish().unwrap();
    cursor.into_inner()
}

/// Build a zipped county shapefile, using `scratch` for the
/// intermediate parts, and return the archive bytes.
pub(crate) fn county_zip_bytes(scratch: &Path) -> Vec<u8> {
    fs::create_dir_all(scratch).unwrap();
    let parts = write_county_shapefile(scratch);
    zip_files_bytes(&parts)
}
