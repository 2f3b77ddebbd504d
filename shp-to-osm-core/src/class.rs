//! Geometry classes that select a mapping-rule list.
//!
//! # Examples
//! ```
//! use shp_to_osm_core::GeometryClass;
//!
//! assert_eq!("outer".parse::<GeometryClass>(), Ok(GeometryClass::OuterRing));
//! assert_eq!(GeometryClass::Line.to_string(), "line");
//! ```

/// The role a primitive plays in the source geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryClass {
    /// A standalone point.
    Point,
    /// A line string.
    Line,
    /// The outer ring of a polygon.
    OuterRing,
    /// A hole inside a polygon.
    InnerRing,
}

impl GeometryClass {
    /// Every class, in rule-file declaration order.
    pub const ALL: [Self; 4] = [Self::Point, Self::Line, Self::OuterRing, Self::InnerRing];

    /// Rule-file token for the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::OuterRing => "outer",
            Self::InnerRing => "inner",
        }
    }
}

impl std::fmt::Display for GeometryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeometryClass {
    type Err = String;

    /// Tokens are case-sensitive, matching the rule-file format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| format!("unknown geometry class '{s}'"))
    }
}
