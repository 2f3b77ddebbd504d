//! The conversion driver.
//!
//! Records are pulled one at a time from a [`FeatureSource`], turned into
//! tagged output units, filtered, optionally glommed, and handed to a
//! [`BoundedAssembler`].

use geo::Geometry;
use log::{info, warn};
use thiserror::Error;

use crate::attribute::AttributeMap;
use crate::glom::{GlomStage, GlomStrategies};
use crate::output::{BoundedAssembler, FileTarget, OutputError, OutputSummary};
use crate::primitive::IdAllocator;
use crate::rules::RuleSet;
use crate::shell::{ShellContext, build_unit};
use crate::unit::OutputUnit;

/// One input record: a geometry with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Record geometry in longitude/latitude order.
    pub geometry: Geometry<f64>,
    /// Record attributes.
    pub attributes: AttributeMap,
}

impl Feature {
    /// Pair a geometry with its attributes.
    #[must_use]
    pub const fn new(geometry: Geometry<f64>, attributes: AttributeMap) -> Self {
        Self {
            geometry,
            attributes,
        }
    }
}

/// A stream of input records.
pub trait FeatureSource {
    /// Error raised when a record cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Attribute name that holds the geometry and is never turned into tags.
    fn geometry_key(&self) -> &str;

    /// The next record, or `None` once the source is exhausted.
    ///
    /// # Errors
    /// Returns the source's error when a record cannot be read.
    fn next_feature(&mut self) -> Result<Option<Feature>, Self::Error>;
}

/// Switches that shape a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Drop untagged ways that are not relation members, and relations
    /// tagged only with `type`.
    pub keep_only_tagged_ways: bool,
    /// Attribute whose canonical value groups records for glomming.
    pub glom_key: Option<String>,
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertReport {
    /// Records read from the source.
    pub records_read: usize,
    /// Units handed to the output, after glomming.
    pub units_written: usize,
    /// Units left empty by exclusion or tag filtering.
    pub units_dropped: usize,
    /// Records whose geometry could not be converted.
    pub shapes_skipped: usize,
    /// Files and elements written.
    pub output: OutputSummary,
}

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The feature source failed.
    #[error("failed to read input record {record}")]
    Source {
        /// One-based number of the record being read.
        record: usize,
        /// Source error from the feature source.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Writing the unit built from one record failed.
    #[error("failed to write output for input record {record}")]
    Record {
        /// One-based number of the record whose unit was written.
        record: usize,
        /// Source error from the assembler.
        #[source]
        source: OutputError,
    },
    /// Writing output failed.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Converts features into OSM output with one rule set.
///
/// # Examples
/// ```
/// use geo::{Geometry, point};
/// use shp_to_osm_core::test_support::{MemoryTarget, VecSource};
/// use shp_to_osm_core::{
///     AttributeMap, BoundedAssembler, ConvertOptions, Converter, Feature, OutputFormat,
///     OutputSettings, RuleSet,
/// };
///
/// let rules = RuleSet::parse("point,shop,bakery,shop,bakery").rules;
/// let attributes: AttributeMap = [("shop", "bakery")].into_iter().collect();
/// let mut source = VecSource::new(
///     "the_geom",
///     vec![Feature::new(Geometry::Point(point!(x: 5.12, y: 52.09)), attributes)],
/// );
/// let settings = OutputSettings::new("shops", OutputFormat::Legacy, "shp-to-osm");
/// let mut output = BoundedAssembler::new(MemoryTarget::default(), settings);
///
/// let report = Converter::new(&rules, ConvertOptions::default()).convert(&mut source, &mut output)?;
/// assert_eq!(report.output.files, vec!["shops_1.osm".to_owned()]);
/// # Ok::<(), shp_to_osm_core::ConvertError>(())
/// ```
#[derive(Debug)]
pub struct Converter<'r> {
    rules: &'r RuleSet,
    options: ConvertOptions,
    ids: IdAllocator,
    strategies: GlomStrategies,
}

impl<'r> Converter<'r> {
    /// A converter using the default glom strategies.
    #[must_use]
    pub fn new(rules: &'r RuleSet, options: ConvertOptions) -> Self {
        Self {
            rules,
            options,
            ids: IdAllocator::new(),
            strategies: GlomStrategies::default(),
        }
    }

    /// Replace the glom strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: GlomStrategies) -> Self {
        self.strategies = strategies;
        self
    }

    /// Convert every feature of `source` and write the result to `output`.
    ///
    /// With a glom key set, units carrying a value for that key are held back
    /// until the source is exhausted and are written after every other unit.
    ///
    /// # Errors
    /// Returns [`ConvertError::Source`] when a record cannot be read,
    /// [`ConvertError::Record`] when the unit of a single record cannot be
    /// written and [`ConvertError::Output`] when merged units or the final
    /// file cannot be written.
    pub fn convert<S, T>(
        &mut self,
        source: &mut S,
        output: &mut BoundedAssembler<T>,
    ) -> Result<ConvertReport, ConvertError>
    where
        S: FeatureSource,
        T: FileTarget,
    {
        let mut report = ConvertReport::default();
        let mut glom = self.options.glom_key.as_ref().map(|_| GlomStage::new());

        loop {
            let record = report.records_read + 1;
            let next = source.next_feature().map_err(|err| ConvertError::Source {
                record,
                source: Box::new(err),
            })?;
            let Some(feature) = next else {
                break;
            };
            report.records_read = record;

            let context = ShellContext {
                rules: self.rules,
                attributes: &feature.attributes,
                geometry_key: source.geometry_key(),
            };
            let Some(built) = build_unit(&feature.geometry, context, &mut self.ids) else {
                warn!("Record {record}: unsupported geometry, skipped");
                report.shapes_skipped += 1;
                continue;
            };
            let glom_value = self
                .options
                .glom_key
                .as_deref()
                .and_then(|key| feature.attributes.canonical(key));
            let filtered = self.filter(built.with_glom_value(glom_value));
            if filtered.is_empty() {
                report.units_dropped += 1;
                continue;
            }
            let ready = match glom.as_mut() {
                Some(stage) => stage.offer(filtered),
                None => Some(filtered),
            };
            if let Some(unit) = ready {
                output
                    .write_unit(unit)
                    .map_err(|source| ConvertError::Record { record, source })?;
                report.units_written += 1;
            }
        }

        if let Some(stage) = glom {
            info!("Merging {} glom groups", stage.group_count());
            for merged in stage.merge(&self.strategies, &mut self.ids) {
                let filtered = self.filter(merged);
                if filtered.is_empty() {
                    report.units_dropped += 1;
                    continue;
                }
                output.write_unit(filtered)?;
                report.units_written += 1;
            }
        }

        report.output = output.finish()?;
        info!(
            "Converted {} records into {} elements across {} files",
            report.records_read,
            report.output.elements,
            report.output.files.len()
        );
        Ok(report)
    }

    fn filter(&self, mut unit: OutputUnit) -> OutputUnit {
        unit.retain_included(self.rules);
        if self.options.keep_only_tagged_ways {
            unit.retain_tagged_ways();
        }
        unit
    }
}
