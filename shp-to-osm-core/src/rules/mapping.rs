//! Attribute-to-tag mapping rules.

use std::fmt;

use crate::attribute::escape_xml;
use crate::class::GeometryClass;
use crate::primitive::Tag;

/// One `type,srcKey,srcValue,targetKey,targetValue` mapping.
///
/// A missing source value matches any non-empty attribute value; a missing
/// target value copies the matched attribute value into the tag.
///
/// # Examples
/// ```
/// use shp_to_osm_core::{GeometryClass, MappingRule};
///
/// let rule = MappingRule::new(GeometryClass::Point, "NAME", None, "name", None);
/// let tag = rule.create_tag("NAME", "Cafe Au Lait").expect("rule matches");
/// assert_eq!((tag.key(), tag.value()), ("name", "Cafe Au Lait"));
/// assert!(rule.create_tag("TYPE", "cafe").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    class: GeometryClass,
    source_key: String,
    source_value: Option<String>,
    target_key: String,
    target_value: Option<String>,
}

impl MappingRule {
    /// Build a rule. The target key and value are XML-escaped here; the
    /// source value is compared verbatim against canonical attribute values.
    #[must_use]
    pub fn new(
        class: GeometryClass,
        source_key: impl Into<String>,
        source_value: Option<String>,
        target_key: &str,
        target_value: Option<&str>,
    ) -> Self {
        Self {
            class,
            source_key: source_key.into(),
            source_value,
            target_key: escape_xml(target_key),
            target_value: target_value.map(escape_xml),
        }
    }

    /// Geometry class whose rule list holds this rule.
    #[must_use]
    pub const fn class(&self) -> GeometryClass {
        self.class
    }

    /// Attribute key the rule reacts to.
    #[must_use]
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// Required attribute value, or `None` for "any value".
    #[must_use]
    pub fn source_value(&self) -> Option<&str> {
        self.source_value.as_deref()
    }

    /// Escaped tag key to emit.
    #[must_use]
    pub fn target_key(&self) -> &str {
        &self.target_key
    }

    /// Escaped tag value to emit, or `None` to reuse the attribute value.
    #[must_use]
    pub fn target_value(&self) -> Option<&str> {
        self.target_value.as_deref()
    }

    /// Produce a tag when the attribute matches this rule.
    ///
    /// `canonical_value` must already be canonicalized and escaped.
    #[must_use]
    pub fn create_tag(&self, source_key: &str, canonical_value: &str) -> Option<Tag> {
        if source_key != self.source_key {
            return None;
        }
        if self
            .source_value
            .as_deref()
            .is_some_and(|expected| expected != canonical_value)
        {
            return None;
        }
        let value = self.target_value.as_deref().unwrap_or(canonical_value);
        Some(Tag::new(self.target_key.clone(), value))
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rule {}={} -> {}={}",
            self.class,
            self.source_key,
            self.source_value.as_deref().unwrap_or("*"),
            self.target_key,
            self.target_value.as_deref().unwrap_or("-"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bakery", true)]
    #[case("butcher", false)]
    #[case("Bakery", false)]
    fn concrete_source_value_needs_exact_match(#[case] value: &str, #[case] matches: bool) {
        let rule = MappingRule::new(
            GeometryClass::Point,
            "shop",
            Some("bakery".into()),
            "shop",
            Some("bakery"),
        );
        assert_eq!(rule.create_tag("shop", value).is_some(), matches);
    }

    #[rstest]
    fn wildcard_matches_any_value_and_copies_it() {
        let rule = MappingRule::new(GeometryClass::Line, "NAME", None, "name", None);
        let tag = rule.create_tag("NAME", "High &amp; Low").expect("wildcard matches");
        assert_eq!(tag.value(), "High &amp; Low");
    }

    #[rstest]
    fn fixed_target_value_overrides_source() {
        let rule = MappingRule::new(GeometryClass::Line, "CLASS", None, "highway", Some("road"));
        let tag = rule.create_tag("CLASS", "4").expect("wildcard matches");
        assert_eq!((tag.key(), tag.value()), ("highway", "road"));
    }

    #[rstest]
    fn targets_are_escaped_on_construction() {
        let rule = MappingRule::new(GeometryClass::Point, "k", None, "a<b", Some("x&y"));
        assert_eq!(rule.target_key(), "a&lt;b");
        assert_eq!(rule.target_value(), Some("x&amp;y"));
    }
}
