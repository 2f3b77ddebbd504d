//! Core conversion engine for shp-to-osm.
//!
//! Records made of a `geo` geometry and an attribute table are turned into
//! tagged OpenStreetMap nodes, ways and relations. A [`RuleSet`] read from a
//! rule file decides which tags each element receives and which elements are
//! excluded. Elements derived from one record travel together as an
//! [`OutputUnit`], may be merged with related units by the glom stage, and are
//! finally written by a [`BoundedAssembler`] into numbered OSM XML files of
//! bounded size.
//!
//! Reading the input format is left to a [`FeatureSource`] implementation;
//! storing finished files is left to a [`FileTarget`].

mod attribute;
mod class;
mod convert;
mod glom;
mod output;
mod primitive;
mod rules;
mod shell;
mod unit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use attribute::{AttributeMap, AttributeValue, canonicalize, escape_xml};
pub use class::GeometryClass;
pub use convert::{ConvertError, ConvertOptions, ConvertReport, Converter, Feature, FeatureSource};
pub use glom::{CollectionRelation, GlomStage, GlomStrategies, GlomStrategy, JoinWays, MultipolygonRelation};
pub use output::{
    BoundedAssembler, DEFAULT_MAX_ELEMENTS_PER_FILE, FileTarget, OutputError, OutputFormat, OutputSettings,
    OutputSummary, XmlDocument, format_coordinate,
};
pub use primitive::{IdAllocator, Member, Primitive, PrimitiveKind, Shape, Tag};
pub use rules::{ExcludeRule, MappingRule, ParseWarning, ParsedRules, RuleFileError, RuleSet};
pub use shell::{ShellContext, build_unit, classify};
pub use unit::{OutputUnit, RELATION_TYPE_KEY};
