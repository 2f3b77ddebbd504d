//! Glomming: coalescing output units that share a glom-key value.
//!
//! Units carrying a glom value are buffered by `(class, value)` until the
//! input is exhausted. Each group holding more than one unit is then merged by
//! the [`GlomStrategy`] registered for its class. Units without a glom value
//! pass straight through.

mod strategy;

use std::collections::HashMap;

use log::debug;

pub use strategy::{CollectionRelation, GlomStrategy, JoinWays, MultipolygonRelation};

use crate::class::GeometryClass;
use crate::primitive::IdAllocator;
use crate::unit::OutputUnit;

/// Merge policy for every geometry class.
///
/// # Examples
/// ```
/// use shp_to_osm_core::{GeometryClass, GlomStrategies, JoinWays};
///
/// let mut strategies = GlomStrategies::default();
/// strategies.register(GeometryClass::Point, Box::new(JoinWays));
/// ```
#[derive(Debug)]
pub struct GlomStrategies {
    point: Box<dyn GlomStrategy>,
    line: Box<dyn GlomStrategy>,
    outer: Box<dyn GlomStrategy>,
    // Records never classify as inner rings, so this entry is never looked
    // up during a run; it only keeps the table total over `GeometryClass`.
    inner: Box<dyn GlomStrategy>,
}

impl Default for GlomStrategies {
    fn default() -> Self {
        Self {
            point: Box::new(CollectionRelation),
            line: Box::new(JoinWays),
            outer: Box::new(MultipolygonRelation),
            inner: Box::new(MultipolygonRelation),
        }
    }
}

impl GlomStrategies {
    /// Replace the strategy used for `class`.
    pub fn register(&mut self, class: GeometryClass, strategy: Box<dyn GlomStrategy>) {
        *self.slot(class) = strategy;
    }

    /// Strategy used for `class`.
    #[must_use]
    pub fn for_class(&self, class: GeometryClass) -> &dyn GlomStrategy {
        match class {
            GeometryClass::Point => self.point.as_ref(),
            GeometryClass::Line => self.line.as_ref(),
            GeometryClass::OuterRing => self.outer.as_ref(),
            GeometryClass::InnerRing => self.inner.as_ref(),
        }
    }

    const fn slot(&mut self, class: GeometryClass) -> &mut Box<dyn GlomStrategy> {
        match class {
            GeometryClass::Point => &mut self.point,
            GeometryClass::Line => &mut self.line,
            GeometryClass::OuterRing => &mut self.outer,
            GeometryClass::InnerRing => &mut self.inner,
        }
    }
}

#[derive(Debug)]
struct GlomGroup {
    class: GeometryClass,
    value: String,
    units: Vec<OutputUnit>,
}

/// Buffers units by glom value until the input ends.
#[derive(Debug, Default)]
pub struct GlomStage {
    groups: Vec<GlomGroup>,
    index: HashMap<(GeometryClass, String), usize>,
}

impl GlomStage {
    /// An empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer `unit` in its group, or hand it back when it has no glom value.
    pub fn offer(&mut self, unit: OutputUnit) -> Option<OutputUnit> {
        let Some(value) = unit.glom_value() else {
            return Some(unit);
        };
        let key = (unit.class(), value.to_owned());
        let position = if let Some(existing) = self.index.get(&key) {
            *existing
        } else {
            let created = self.groups.len();
            self.groups.push(GlomGroup {
                class: key.0,
                value: key.1.clone(),
                units: Vec::new(),
            });
            self.index.insert(key, created);
            created
        };
        if let Some(group) = self.groups.get_mut(position) {
            group.units.push(unit);
        }
        None
    }

    /// Number of groups opened so far.
    #[must_use]
    pub const fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Merge every group, in the order groups were first seen.
    ///
    /// Groups of a single unit are returned unchanged.
    #[must_use]
    pub fn merge(self, strategies: &GlomStrategies, ids: &mut IdAllocator) -> Vec<OutputUnit> {
        let mut merged = Vec::with_capacity(self.groups.len());
        for GlomGroup { class, value, mut units } in self.groups {
            if units.len() == 1 {
                merged.extend(units.pop());
                continue;
            }
            debug!("Glomming {} {class} units with value '{value}'", units.len());
            merged.push(strategies.for_class(class).merge(&value, units, ids));
        }
        merged
    }
}
