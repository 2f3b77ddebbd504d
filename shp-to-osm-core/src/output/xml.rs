//! Hand-written OSM XML.
//!
//! Tag keys, tag values and member roles are stored escaped, so they are
//! written verbatim. Only the generator string is escaped here.

use std::fmt::Write as _;

use super::OutputFormat;
use super::coordinate::format_coordinate;
use crate::attribute::escape_xml;
use crate::primitive::{Primitive, Shape};

/// One output document under construction.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use shp_to_osm_core::{OutputFormat, Primitive, XmlDocument};
///
/// let mut document = XmlDocument::new(OutputFormat::Legacy, "shp-to-osm");
/// document.push(&Primitive::node(-1, Coord { x: 4.9, y: 52.37 }));
/// let xml = document.finish();
/// assert!(xml.contains(r#"<node id="-1" visible="true" lat="52.37" lon="4.9"/>"#));
/// ```
#[derive(Debug, Clone)]
pub struct XmlDocument {
    format: OutputFormat,
    text: String,
}

impl XmlDocument {
    /// Start a document with the header for `format`.
    #[must_use]
    pub fn new(format: OutputFormat, generator: &str) -> Self {
        let mut text = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let escaped = escape_xml(generator);
        match format {
            OutputFormat::Legacy => {
                text.push_str("<osm version=\"0.6\" upload=\"false\" generator=\"");
                text.push_str(&escaped);
                text.push_str("\">\n");
            }
            OutputFormat::Change => {
                text.push_str("<osmChange version=\"0.6\" generator=\"");
                text.push_str(&escaped);
                text.push_str("\">\n<create>\n");
            }
        }
        Self { format, text }
    }

    /// Append one element.
    pub fn push(&mut self, primitive: &Primitive) {
        let element = primitive.kind().as_str();
        self.text.push_str("  <");
        self.text.push_str(element);
        self.attribute("id", &primitive.id().to_string());
        if self.format == OutputFormat::Legacy {
            self.attribute("visible", "true");
        }
        if let Shape::Node(location) = primitive.shape() {
            self.attribute("lat", &format_coordinate(location.y));
            self.attribute("lon", &format_coordinate(location.x));
        }

        let has_children = primitive.is_tagged() || !matches!(primitive.shape(), Shape::Node(_));
        if !has_children {
            self.text.push_str("/>\n");
            return;
        }
        self.text.push_str(">\n");
        match primitive.shape() {
            Shape::Node(_) => {}
            Shape::Way(refs) => {
                for reference in refs {
                    self.line(format_args!("<nd ref=\"{reference}\"/>"));
                }
            }
            Shape::Relation(members) => {
                for member in members {
                    self.line(format_args!(
                        "<member type=\"{}\" ref=\"{}\" role=\"{}\"/>",
                        member.kind,
                        member.reference,
                        escape_xml(&member.role)
                    ));
                }
            }
        }
        for tag in primitive.tags() {
            self.line(format_args!("<tag k=\"{}\" v=\"{}\"/>", tag.key(), tag.value()));
        }
        self.text.push_str("  </");
        self.text.push_str(element);
        self.text.push_str(">\n");
    }

    /// Close the document and return its text.
    #[must_use]
    pub fn finish(mut self) -> String {
        match self.format {
            OutputFormat::Legacy => self.text.push_str("</osm>\n"),
            OutputFormat::Change => self.text.push_str("</create>\n</osmChange>\n"),
        }
        self.text
    }

    fn attribute(&mut self, name: &str, value: &str) {
        self.text.push(' ');
        self.text.push_str(name);
        self.text.push_str("=\"");
        self.text.push_str(value);
        self.text.push('"');
    }

    fn line(&mut self, content: std::fmt::Arguments<'_>) {
        self.text.push_str("    ");
        // Writing into a `String` cannot fail.
        if self.text.write_fmt(content).is_ok() {
            self.text.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{Member, Tag};
    use geo::Coord;
    use rstest::rstest;

    #[rstest]
    fn change_document_wraps_elements_in_create() {
        let mut way = Primitive::way(-3, vec![-1, -2]);
        way.add_tag(Tag::new("name", "A &amp; B"));
        let mut document = XmlDocument::new(OutputFormat::Change, "shp-to-osm <dev>");
        document.push(&way);
        let xml = document.finish();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<osmChange version=\"0.6\" generator=\"shp-to-osm &lt;dev&gt;\">\n<create>\n"));
        assert!(xml.contains(
            "  <way id=\"-3\">\n    <nd ref=\"-1\"/>\n    <nd ref=\"-2\"/>\n    <tag k=\"name\" v=\"A &amp; B\"/>\n  </way>\n"
        ));
        assert!(xml.ends_with("</create>\n</osmChange>\n"));
        assert!(!xml.contains("visible"));
    }

    #[rstest]
    fn legacy_document_marks_elements_visible() {
        let mut node = Primitive::node(-1, Coord { x: -0.0, y: 51.477_928_1 });
        node.add_tag(Tag::new("name", "Greenwich"));
        let mut document = XmlDocument::new(OutputFormat::Legacy, "shp-to-osm");
        document.push(&node);
        let xml = document.finish();

        assert!(xml.contains("<osm version=\"0.6\" upload=\"false\" generator=\"shp-to-osm\">"));
        assert!(xml.contains("<node id=\"-1\" visible=\"true\" lat=\"51.4779281\" lon=\"0\">"));
        assert!(xml.ends_with("</osm>\n"));
    }

    #[rstest]
    fn relations_list_members_before_tags() {
        let mut relation = Primitive::relation(-9, vec![Member::way(-4, "outer"), Member::node(-1, "")]);
        relation.add_tag(Tag::new("type", "multipolygon"));
        let mut document = XmlDocument::new(OutputFormat::Change, "g");
        document.push(&relation);
        let xml = document.finish();
        assert!(xml.contains(
            "    <member type=\"way\" ref=\"-4\" role=\"outer\"/>\n    <member type=\"node\" ref=\"-1\" role=\"\"/>\n    <tag k=\"type\" v=\"multipolygon\"/>\n"
        ));
    }
}
