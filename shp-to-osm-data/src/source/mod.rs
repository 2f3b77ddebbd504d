//! Shapefile feature source.

mod attributes;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geo::Geometry;
use log::{debug, warn};
use shapefile::{Reader, Shape};
use shp_to_osm_core::{Feature, FeatureSource};
use thiserror::Error;

use attributes::attribute_map;
pub use attributes::ColumnRecord;

/// Attribute name reported for the geometry column.
///
/// dBase tables hold no geometry column, so no attribute ever carries this
/// name; it is reserved so rules can never tag a geometry.
pub const GEOMETRY_KEY: &str = "the_geom";

/// Errors returned while reading a shapefile.
#[derive(Debug, Error)]
pub enum ShapefileSourceError {
    /// The `.shp`, `.shx` or `.dbf` file could not be opened.
    #[error("failed to open shapefile at {path:?}")]
    Open {
        /// Source error from the shapefile reader.
        #[source]
        source: shapefile::Error,
        /// Path of the `.shp` file.
        path: PathBuf,
    },
    /// A shape or its record could not be decoded.
    #[error("failed to decode record {record} of shapefile {path:?}")]
    Decode {
        /// Source error from the shapefile reader.
        #[source]
        source: shapefile::Error,
        /// Path of the `.shp` file.
        path: PathBuf,
        /// One-based record number.
        record: usize,
    },
}

/// An open shapefile.
///
/// # Examples
/// ```no_run
/// use shp_to_osm_core::FeatureSource;
/// use shp_to_osm_data::ShapefileReader;
///
/// # fn main() -> Result<(), shp_to_osm_data::ShapefileSourceError> {
/// let mut reader = ShapefileReader::open("roads.shp")?;
/// let mut features = reader.features();
/// while let Some(feature) = features.next_feature()? {
///     println!("{} attributes", feature.attributes.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ShapefileReader {
    path: PathBuf,
    reader: Reader<BufReader<File>, BufReader<File>>,
}

impl std::fmt::Debug for ShapefileReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapefileReader")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ShapefileReader {
    /// Open the `.shp` file at `path` together with its `.shx` and `.dbf`
    /// siblings.
    ///
    /// # Errors
    /// Returns [`ShapefileSourceError::Open`] when any of the files cannot be
    /// opened or their headers cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShapefileSourceError> {
        let shp = path.as_ref().to_path_buf();
        let reader = Reader::from_path(&shp).map_err(|source| ShapefileSourceError::Open {
            source,
            path: shp.clone(),
        })?;
        debug!("Opened shapefile {}", shp.display());
        Ok(Self { path: shp, reader })
    }

    /// Path of the `.shp` file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream the shapefile's records as features.
    pub fn features(
        &mut self,
    ) -> ShapefileSource<'_, impl Iterator<Item = Result<(Shape, ColumnRecord), shapefile::Error>> + '_> {
        ShapefileSource {
            path: &self.path,
            records: self.reader.iter_shapes_and_records_as::<Shape, ColumnRecord>(),
            read: 0,
            skipped: 0,
        }
    }
}

/// Features read from an open shapefile.
///
/// Shapes without a `geo` equivalent, such as null shapes, are skipped with a
/// warning and counted.
#[derive(Debug)]
pub struct ShapefileSource<'a, I> {
    path: &'a Path,
    records: I,
    read: usize,
    skipped: usize,
}

impl<I> ShapefileSource<'_, I> {
    /// Shapes skipped so far.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<I> FeatureSource for ShapefileSource<'_, I>
where
    I: Iterator<Item = Result<(Shape, ColumnRecord), shapefile::Error>>,
{
    type Error = ShapefileSourceError;

    fn geometry_key(&self) -> &str {
        GEOMETRY_KEY
    }

    fn next_feature(&mut self) -> Result<Option<Feature>, Self::Error> {
        for next in self.records.by_ref() {
            self.read += 1;
            let (shape, record) = next.map_err(|source| ShapefileSourceError::Decode {
                source,
                path: self.path.to_path_buf(),
                record: self.read,
            })?;
            let shape_type = shape.shapetype();
            match Geometry::<f64>::try_from(shape) {
                Ok(geometry) => return Ok(Some(Feature::new(geometry, attribute_map(record)))),
                Err(reason) => {
                    warn!("Record {}: skipping {shape_type:?} shape: {reason}", self.read);
                    self.skipped += 1;
                }
            }
        }
        Ok(None)
    }
}
