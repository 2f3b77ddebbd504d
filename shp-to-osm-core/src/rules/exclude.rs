//! Exclusion filters that veto primitives.

use std::fmt;

use crate::attribute::escape_xml;
use crate::primitive::{Primitive, PrimitiveKind};

/// Vetoes primitives of one kind carrying `key=value`.
///
/// # Examples
/// ```
/// use shp_to_osm_core::{ExcludeRule, Primitive, PrimitiveKind, Tag};
///
/// let rule = ExcludeRule::new(PrimitiveKind::Way, "highway", "track");
/// let mut way = Primitive::way(-1, vec![-2, -3]);
/// way.add_tag(Tag::new("highway", "track"));
/// assert!(!rule.allows(&way));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeRule {
    kind: PrimitiveKind,
    key: String,
    value: String,
}

impl ExcludeRule {
    /// Build a rule; key and value are escaped so they compare against
    /// stored tags.
    #[must_use]
    pub fn new(kind: PrimitiveKind, key: &str, value: &str) -> Self {
        Self {
            kind,
            key: escape_xml(key),
            value: escape_xml(value),
        }
    }

    /// Kind of primitive this rule inspects.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Whether `primitive` survives this rule.
    #[must_use]
    pub fn allows(&self, primitive: &Primitive) -> bool {
        primitive.kind() != self.kind || !primitive.has_tag(&self.key, &self.value)
    }
}

impl fmt::Display for ExcludeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exclude {} with {}={}", self.kind, self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Tag;
    use geo::Coord;
    use rstest::rstest;

    #[rstest]
    fn other_kinds_pass() {
        let rule = ExcludeRule::new(PrimitiveKind::Way, "highway", "track");
        let mut node = Primitive::node(-1, Coord { x: 0.0, y: 0.0 });
        node.add_tag(Tag::new("highway", "track"));
        assert!(rule.allows(&node));
    }

    #[rstest]
    fn escaped_values_compare_against_tags() {
        let rule = ExcludeRule::new(PrimitiveKind::Node, "name", "A & B");
        let mut node = Primitive::node(-1, Coord { x: 0.0, y: 0.0 });
        node.add_tag(Tag::new("name", "A &amp; B"));
        assert!(!rule.allows(&node));
    }
}
