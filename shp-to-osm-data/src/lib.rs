//! Input adapters for shp-to-osm.
//!
//! Responsibilities:
//! - Read ESRI shapefiles (geometry plus dBase attribute table).
//! - Convert shapes into `geo` geometries and dBase fields into attribute
//!   values understood by `shp-to-osm-core`.
//!
//! Boundaries:
//! - Do not encode tagging rules (live in `shp-to-osm-core`).
//! - Do not write output.

mod source;

pub use source::{ColumnRecord, GEOMETRY_KEY, ShapefileReader, ShapefileSource, ShapefileSourceError};
