//! OpenStreetMap element shells.
//!
//! Primitives carry placeholder identifiers handed out by an [`IdAllocator`].
//! Identifiers are negative, which OSM editors and upload tools treat as
//! "not yet created".

use geo::Coord;

/// OSM element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// A single location.
    Node,
    /// An ordered list of nodes.
    Way,
    /// An ordered list of members with roles.
    Relation,
}

impl PrimitiveKind {
    /// Element name used in rule files and OSM XML.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrimitiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            _ => Err(format!("unknown primitive kind '{s}'")),
        }
    }
}

/// A key/value pair attached to a primitive.
///
/// Both halves are stored XML-escaped, ready to be written verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    /// Build a tag from already-escaped text.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Escaped tag key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Escaped tag value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A relation member reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Kind of the referenced element.
    pub kind: PrimitiveKind,
    /// Identifier of the referenced element.
    pub reference: i64,
    /// Member role, e.g. `outer`.
    pub role: String,
}

impl Member {
    /// Reference a way with the given role.
    #[must_use]
    pub fn way(reference: i64, role: impl Into<String>) -> Self {
        Self {
            kind: PrimitiveKind::Way,
            reference,
            role: role.into(),
        }
    }

    /// Reference a node with the given role.
    #[must_use]
    pub fn node(reference: i64, role: impl Into<String>) -> Self {
        Self {
            kind: PrimitiveKind::Node,
            reference,
            role: role.into(),
        }
    }
}

/// Geometry payload of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Node location, `x = longitude`, `y = latitude`.
    Node(Coord<f64>),
    /// Ordered node references.
    Way(Vec<i64>),
    /// Ordered relation members.
    Relation(Vec<Member>),
}

/// An OSM element with its tags.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use shp_to_osm_core::{Primitive, PrimitiveKind, Tag};
///
/// let mut node = Primitive::node(-1, Coord { x: 4.9, y: 52.3 });
/// node.add_tag(Tag::new("amenity", "cafe"));
/// assert_eq!(node.kind(), PrimitiveKind::Node);
/// assert!(node.has_tag("amenity", "cafe"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    id: i64,
    shape: Shape,
    tags: Vec<Tag>,
}

impl Primitive {
    /// Untagged node at `location`.
    #[must_use]
    pub const fn node(id: i64, location: Coord<f64>) -> Self {
        Self {
            id,
            shape: Shape::Node(location),
            tags: Vec::new(),
        }
    }

    /// Untagged way over `refs`.
    #[must_use]
    pub const fn way(id: i64, refs: Vec<i64>) -> Self {
        Self {
            id,
            shape: Shape::Way(refs),
            tags: Vec::new(),
        }
    }

    /// Untagged relation over `members`.
    #[must_use]
    pub const fn relation(id: i64, members: Vec<Member>) -> Self {
        Self {
            id,
            shape: Shape::Relation(members),
            tags: Vec::new(),
        }
    }

    /// Placeholder identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Element kind derived from the shape.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self.shape {
            Shape::Node(_) => PrimitiveKind::Node,
            Shape::Way(_) => PrimitiveKind::Way,
            Shape::Relation(_) => PrimitiveKind::Relation,
        }
    }

    /// Geometry payload.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Node location, if this is a node.
    #[must_use]
    pub const fn location(&self) -> Option<Coord<f64>> {
        match self.shape {
            Shape::Node(location) => Some(location),
            Shape::Way(_) | Shape::Relation(_) => None,
        }
    }

    /// Node references of a way; empty for other kinds.
    #[must_use]
    pub fn node_refs(&self) -> &[i64] {
        match &self.shape {
            Shape::Way(refs) => refs,
            Shape::Node(_) | Shape::Relation(_) => &[],
        }
    }

    /// Members of a relation; empty for other kinds.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        match &self.shape {
            Shape::Relation(members) => members,
            Shape::Node(_) | Shape::Way(_) => &[],
        }
    }

    pub(crate) const fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Tags in insertion order. Duplicate keys are kept.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Append a tag without deduplicating.
    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Remove and return every tag.
    pub fn take_tags(&mut self) -> Vec<Tag> {
        std::mem::take(&mut self.tags)
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|tag| (tag.key == key).then_some(tag.value.as_str()))
    }

    /// Whether any tag matches both `key` and `value`.
    #[must_use]
    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.key == key && tag.value == value)
    }

    /// Whether the primitive carries at least one tag.
    #[must_use]
    pub const fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Hands out negative placeholder identifiers, starting at `-1`.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: i64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: -1 }
    }
}

impl IdAllocator {
    /// Create an allocator starting at `-1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next unused identifier.
    pub const fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }
}
