//! Facade crate for the shp-to-osm converter.
//!
//! This crate re-exports the conversion engine and, behind the `shapefile`
//! feature, the shapefile reader that feeds it.
//!
//! # Examples
//! ```
//! use shp_to_osm::{GeometryClass, RuleSet};
//!
//! let parsed = RuleSet::parse("line,TYPE,,highway,-\nway,exclude,highway,track\n");
//! assert_eq!(parsed.rules.rules_for(GeometryClass::Line).len(), 1);
//! assert_eq!(parsed.rules.exclusions().len(), 1);
//! ```

#![forbid(unsafe_code)]

pub use shp_to_osm_core::{
    AttributeMap, AttributeValue, BoundedAssembler, CollectionRelation, ConvertError, ConvertOptions,
    ConvertReport, Converter, DEFAULT_MAX_ELEMENTS_PER_FILE, ExcludeRule, Feature, FeatureSource,
    FileTarget, GeometryClass, GlomStrategies, GlomStrategy, JoinWays, MappingRule, MultipolygonRelation,
    OutputError, OutputFormat, OutputSettings, OutputSummary, OutputUnit, ParseWarning, ParsedRules,
    Primitive, RuleFileError, RuleSet, canonicalize,
};

#[cfg(feature = "test-support")]
pub use shp_to_osm_core::test_support;

#[cfg(feature = "shapefile")]
pub use shp_to_osm_data::{ColumnRecord, ShapefileReader, ShapefileSource, ShapefileSourceError};
