//! Mapping rules, exclusion filters and the rule set that applies them.

mod exclude;
mod mapping;
mod parse;

pub use exclude::ExcludeRule;
pub use mapping::MappingRule;
pub use parse::{ParseWarning, ParsedRules, RuleFileError};

use crate::attribute::{AttributeMap, canonicalize, escape_xml};
use crate::class::GeometryClass;
use crate::primitive::{Primitive, Tag};

/// Ordered mapping rules per geometry class, exclusion filters and the
/// optional copy-all-attributes mode.
///
/// A rule set is assembled once, before conversion starts, and is only read
/// afterwards.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use shp_to_osm_core::{AttributeMap, Primitive, RuleSet};
///
/// let rules = RuleSet::parse("point,shop,bakery,shop,bakery").rules;
/// let attributes: AttributeMap = [("shop", "bakery")].into_iter().collect();
/// let mut nodes = [Primitive::node(-1, Coord { x: 0.0, y: 0.0 })];
/// rules.apply_point_rules(&attributes, "the_geom", &mut nodes);
/// assert!(nodes[0].has_tag("shop", "bakery"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    point: Vec<MappingRule>,
    line: Vec<MappingRule>,
    outer: Vec<MappingRule>,
    inner: Vec<MappingRule>,
    exclusions: Vec<ExcludeRule>,
    copy_all_prefix: Option<String>,
}

impl RuleSet {
    /// An empty rule set: no tags, no exclusions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule set that only copies every attribute, keyed `prefix:key`
    /// (or bare `key` when the prefix is empty).
    #[must_use]
    pub fn with_copy_all_tags(prefix: impl Into<String>) -> Self {
        Self {
            copy_all_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Enable or disable copy-all mode.
    pub fn set_copy_all_tags(&mut self, prefix: Option<String>) {
        self.copy_all_prefix = prefix;
    }

    /// Prefix used by copy-all mode, when enabled.
    #[must_use]
    pub fn copy_all_prefix(&self) -> Option<&str> {
        self.copy_all_prefix.as_deref()
    }

    /// Append a mapping rule to the list of its class.
    pub fn add_rule(&mut self, rule: MappingRule) {
        self.rules_mut(rule.class()).push(rule);
    }

    /// Append an exclusion filter.
    pub fn add_exclusion(&mut self, rule: ExcludeRule) {
        self.exclusions.push(rule);
    }

    /// Mapping rules for `class`, in declaration order.
    #[must_use]
    pub fn rules_for(&self, class: GeometryClass) -> &[MappingRule] {
        match class {
            GeometryClass::Point => &self.point,
            GeometryClass::Line => &self.line,
            GeometryClass::OuterRing => &self.outer,
            GeometryClass::InnerRing => &self.inner,
        }
    }

    const fn rules_mut(&mut self, class: GeometryClass) -> &mut Vec<MappingRule> {
        match class {
            GeometryClass::Point => &mut self.point,
            GeometryClass::Line => &mut self.line,
            GeometryClass::OuterRing => &mut self.outer,
            GeometryClass::InnerRing => &mut self.inner,
        }
    }

    /// Exclusion filters, in declaration order.
    #[must_use]
    pub fn exclusions(&self) -> &[ExcludeRule] {
        &self.exclusions
    }

    /// Whether every exclusion filter allows `primitive`.
    #[must_use]
    pub fn includes(&self, primitive: &Primitive) -> bool {
        self.exclusions.iter().all(|rule| rule.allows(primitive))
    }

    /// Append `other`'s mapping rules and exclusions after this set's own.
    /// Copy-all mode is left untouched.
    pub fn append_rules(&mut self, other: &Self) {
        for class in GeometryClass::ALL {
            self.rules_mut(class)
                .extend_from_slice(other.rules_for(class));
        }
        self.exclusions.extend_from_slice(&other.exclusions);
    }

    /// Tag `targets` from `attributes` using the rules of `class`.
    ///
    /// Copy-all tags come first. Every rule is then tried against every
    /// attribute (except `geometry_key`), and each produced tag is appended to
    /// every target.
    pub fn apply_rules(
        &self,
        class: GeometryClass,
        attributes: &AttributeMap,
        geometry_key: &str,
        targets: &mut [Primitive],
    ) {
        if let Some(prefix) = &self.copy_all_prefix {
            for target in targets.iter_mut() {
                copy_attributes(attributes, geometry_key, prefix, target);
            }
        }

        let rules = self.rules_for(class);
        for (key, value) in attributes.iter() {
            if key == geometry_key {
                continue;
            }
            let Some(canonical) = canonicalize(value) else {
                continue;
            };
            for tag in rules.iter().filter_map(|rule| rule.create_tag(key, &canonical)) {
                for target in targets.iter_mut() {
                    target.add_tag(tag.clone());
                }
            }
        }
    }

    /// [`RuleSet::apply_rules`] with the point rules.
    pub fn apply_point_rules(&self, attributes: &AttributeMap, geometry_key: &str, targets: &mut [Primitive]) {
        self.apply_rules(GeometryClass::Point, attributes, geometry_key, targets);
    }

    /// [`RuleSet::apply_rules`] with the line rules.
    pub fn apply_line_rules(&self, attributes: &AttributeMap, geometry_key: &str, targets: &mut [Primitive]) {
        self.apply_rules(GeometryClass::Line, attributes, geometry_key, targets);
    }

    /// [`RuleSet::apply_rules`] with the outer-ring rules.
    pub fn apply_outer_polygon_rules(
        &self,
        attributes: &AttributeMap,
        geometry_key: &str,
        targets: &mut [Primitive],
    ) {
        self.apply_rules(GeometryClass::OuterRing, attributes, geometry_key, targets);
    }

    /// [`RuleSet::apply_rules`] with the inner-ring rules.
    pub fn apply_inner_polygon_rules(
        &self,
        attributes: &AttributeMap,
        geometry_key: &str,
        targets: &mut [Primitive],
    ) {
        self.apply_rules(GeometryClass::InnerRing, attributes, geometry_key, targets);
    }
}

fn copy_attributes(attributes: &AttributeMap, geometry_key: &str, prefix: &str, target: &mut Primitive) {
    for (key, value) in attributes.iter() {
        if key == geometry_key {
            continue;
        }
        let Some(canonical) = canonicalize(value) else {
            continue;
        };
        let tag_key = if prefix.is_empty() {
            escape_xml(key)
        } else {
            escape_xml(&format!("{prefix}:{key}"))
        };
        target.add_tag(Tag::new(tag_key, canonical));
    }
}
