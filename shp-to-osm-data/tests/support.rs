//! Shapefile fixtures written on the fly.

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Writer};
use std::path::{Path, PathBuf};

/// A point record: coordinates plus an optional `NAME` value.
pub type PointRecord = (f64, f64, Option<&'static str>);

/// Write a point shapefile with `NAME` and `LANES` columns into `dir`.
pub fn write_points(dir: &Path, stem: &str, points: &[PointRecord]) -> PathBuf {
    let path = dir.join(format!("{stem}.shp"));
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("NAME").expect("valid field name"), 32)
        .add_numeric_field(FieldName::try_from("LANES").expect("valid field name"), 4, 0);
    let mut writer = Writer::from_path(&path, table).expect("create shapefile");
    for (lanes, (x, y, name)) in points.iter().enumerate() {
        let mut record = Record::default();
        record.insert(
            "NAME".to_owned(),
            FieldValue::Character(name.map(str::to_owned)),
        );
        let lane_count = u32::try_from(lanes).expect("small record count");
        record.insert(
            "LANES".to_owned(),
            FieldValue::Numeric(Some(f64::from(lane_count))),
        );
        writer
            .write_shape_and_record(&Point::new(*x, *y), &record)
            .expect("write record");
    }
    drop(writer);
    path
}
