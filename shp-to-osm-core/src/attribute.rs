//! Attribute values read from a feature's attribute table.
//!
//! Every value used for rule matching or tag emission first passes through
//! [`canonicalize`], which trims text, prints integral floating-point numbers
//! without a fractional part, and XML-escapes the result. Attribute stores
//! such as dBase tables routinely box integers as doubles, so a house number
//! of `12` must not leak out as `12.0`.
//!
//! # Examples
//! ```
//! use shp_to_osm_core::{AttributeValue, canonicalize};
//!
//! assert_eq!(canonicalize(&AttributeValue::Float(5.0)), Some("5".to_owned()));
//! assert_eq!(canonicalize(&AttributeValue::Float(2.5)), Some("2.5".to_owned()));
//! assert_eq!(canonicalize(&AttributeValue::Text("  ".into())), None);
//! ```

use std::fmt;

/// A raw attribute value as supplied by the input source.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Integral number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Free text.
    Text(String),
    /// Missing value.
    Null,
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(number) => write!(f, "{number}"),
            Self::Float(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Null => Ok(()),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T> From<Option<T>> for AttributeValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered attribute set describing one input record.
///
/// Keys are unique; inserting an existing key replaces its value in place so
/// the original column order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    /// Create an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = key.into();
        let raw = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = raw,
            None => self.entries.push((name, raw)),
        }
    }

    /// Look up the raw value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find_map(|(existing, value)| (existing == key).then_some(value))
    }

    /// Canonical, escaped value for `key`, or `None` when absent or empty.
    #[must_use]
    pub fn canonical(&self, key: &str) -> Option<String> {
        self.get(key).and_then(canonicalize)
    }

    /// Iterate over the attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Number of attributes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no attributes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeMap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Convert a raw attribute value into its canonical, XML-escaped form.
///
/// Returns `None` for null values and for values whose string form is empty
/// after trimming.
#[must_use]
pub fn canonicalize(value: &AttributeValue) -> Option<String> {
    let raw = match value {
        AttributeValue::Null => return None,
        AttributeValue::Float(number) => float_string(*number),
        AttributeValue::Integer(number) => number.to_string(),
        AttributeValue::Text(text) => text.trim().to_owned(),
    };
    (!raw.is_empty()).then(|| escape_xml(&raw))
}

fn float_string(number: f64) -> String {
    if number.floor() != number {
        return number.to_string();
    }
    // `{:.0}` keeps the sign of negative zero.
    if number == 0.0 {
        "0".to_owned()
    } else {
        format!("{number:.0}")
    }
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(AttributeValue::Float(5.0), Some("5"))]
    #[case(AttributeValue::Float(-12.0), Some("-12"))]
    #[case(AttributeValue::Float(-0.0), Some("0"))]
    #[case(AttributeValue::Float(2.5), Some("2.5"))]
    #[case(AttributeValue::Float(12_345_678_901.0), Some("12345678901"))]
    #[case(AttributeValue::Integer(42), Some("42"))]
    #[case(AttributeValue::Text("  Main St ".into()), Some("Main St"))]
    #[case(AttributeValue::Text("A & B".into()), Some("A &amp; B"))]
    #[case(AttributeValue::Text("   ".into()), None)]
    #[case(AttributeValue::Text(String::new()), None)]
    #[case(AttributeValue::Null, None)]
    fn canonicalizes_values(#[case] value: AttributeValue, #[case] expected: Option<&str>) {
        assert_eq!(canonicalize(&value).as_deref(), expected);
    }

    #[rstest]
    fn escapes_all_special_characters() {
        assert_eq!(escape_xml(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
    }

    #[rstest]
    fn insert_replaces_in_place() {
        let mut map = AttributeMap::new();
        map.insert("name", "Old");
        map.insert("ref", 7_i64);
        map.insert("name", "New");
        let keys: Vec<&str> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["name", "ref"]);
        assert_eq!(map.canonical("name").as_deref(), Some("New"));
    }

    #[rstest]
    fn optional_values_become_null() {
        let map: AttributeMap = [("missing", AttributeValue::from(None::<&str>))]
            .into_iter()
            .collect();
        assert_eq!(map.get("missing"), Some(&AttributeValue::Null));
        assert_eq!(map.canonical("missing"), None);
    }

    proptest! {
        #[test]
        fn integral_floats_print_without_decimal_point(whole in -1_000_000_000_i32..1_000_000_000) {
            let canonical = canonicalize(&AttributeValue::Float(f64::from(whole)));
            prop_assert_eq!(canonical, Some(whole.to_string()));
        }

        #[test]
        fn fractional_floats_keep_their_fraction(whole in -10_000_i32..10_000, tenths in 1_u8..10) {
            let value = f64::from(whole) + f64::from(tenths) / 10.0;
            let canonical = canonicalize(&AttributeValue::Float(value));
            prop_assert!(canonical.is_some_and(|text| text.contains('.')));
        }
    }
}
