//! Turns a record's geometry into tagged primitive shells.
//!
//! Points become nodes and line strings become ways. A polygon without holes
//! becomes one closed way carrying the outer-ring tags. A polygon with holes
//! becomes a `type=multipolygon` relation carrying the outer-ring tags, an
//! untagged outer way, and one closed way per hole carrying the inner-ring
//! tags.

use geo::{Coord, Geometry, LineString, Polygon};

use crate::attribute::AttributeMap;
use crate::class::GeometryClass;
use crate::primitive::{IdAllocator, Member, Primitive, Tag};
use crate::rules::RuleSet;
use crate::unit::{OutputUnit, RELATION_TYPE_KEY};

/// Relation type given to polygons with holes.
pub const MULTIPOLYGON: &str = "multipolygon";
/// Member role of an outer ring.
pub const OUTER_ROLE: &str = "outer";
/// Member role of an inner ring.
pub const INNER_ROLE: &str = "inner";

/// Record data needed to tag shells.
#[derive(Debug, Clone, Copy)]
pub struct ShellContext<'a> {
    /// Rules to apply.
    pub rules: &'a RuleSet,
    /// The record's attributes.
    pub attributes: &'a AttributeMap,
    /// Attribute holding the geometry, never copied into tags.
    pub geometry_key: &'a str,
}

/// Geometry class that selects how a geometry is converted.
///
/// Polygonal records report [`GeometryClass::OuterRing`]; collections and
/// other unsupported geometries report `None`.
#[must_use]
pub const fn classify(geometry: &Geometry<f64>) -> Option<GeometryClass> {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Some(GeometryClass::Point),
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            Some(GeometryClass::Line)
        }
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Some(GeometryClass::OuterRing),
        Geometry::GeometryCollection(_) => None,
    }
}

/// Build the tagged output unit for one record.
///
/// Returns `None` for geometries without a supported class.
///
/// # Examples
/// ```
/// use geo::{Geometry, point};
/// use shp_to_osm_core::{AttributeMap, IdAllocator, RuleSet, ShellContext, build_unit};
///
/// let rules = RuleSet::parse("point,NAME,,name,-").rules;
/// let attributes: AttributeMap = [("NAME", "Cafe Au Lait")].into_iter().collect();
/// let context = ShellContext { rules: &rules, attributes: &attributes, geometry_key: "the_geom" };
/// let geometry = Geometry::Point(point!(x: 4.89, y: 52.37));
///
/// let unit = build_unit(&geometry, context, &mut IdAllocator::new()).expect("points are supported");
/// assert_eq!(unit.nodes()[0].tag("name"), Some("Cafe Au Lait"));
/// ```
#[must_use]
pub fn build_unit(geometry: &Geometry<f64>, context: ShellContext<'_>, ids: &mut IdAllocator) -> Option<OutputUnit> {
    let class = classify(geometry)?;
    let mut unit = OutputUnit::new(class);
    match geometry {
        Geometry::Point(point) => add_points(&mut unit, context, ids, [point.0]),
        Geometry::MultiPoint(points) => add_points(&mut unit, context, ids, points.iter().map(|point| point.0)),
        Geometry::Line(line) => {
            add_lines(&mut unit, context, ids, [LineString::from(vec![line.start, line.end])].iter());
        }
        Geometry::LineString(line) => add_lines(&mut unit, context, ids, std::iter::once(line)),
        Geometry::MultiLineString(lines) => add_lines(&mut unit, context, ids, lines.iter()),
        Geometry::Polygon(polygon) => add_polygon(&mut unit, context, ids, polygon),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                add_polygon(&mut unit, context, ids, polygon);
            }
        }
        Geometry::Rect(rect) => add_polygon(&mut unit, context, ids, &rect.to_polygon()),
        Geometry::Triangle(triangle) => add_polygon(&mut unit, context, ids, &triangle.to_polygon()),
        Geometry::GeometryCollection(_) => return None,
    }
    Some(unit)
}

fn add_points(
    unit: &mut OutputUnit,
    context: ShellContext<'_>,
    ids: &mut IdAllocator,
    locations: impl IntoIterator<Item = Coord<f64>>,
) {
    let mut nodes: Vec<Primitive> = locations
        .into_iter()
        .map(|location| Primitive::node(ids.next_id(), location))
        .collect();
    context
        .rules
        .apply_point_rules(context.attributes, context.geometry_key, &mut nodes);
    for node in nodes {
        unit.push(node);
    }
}

fn add_lines<'g>(
    unit: &mut OutputUnit,
    context: ShellContext<'_>,
    ids: &mut IdAllocator,
    lines: impl Iterator<Item = &'g LineString<f64>>,
) {
    let mut ways: Vec<Primitive> = lines
        .filter(|line| line.0.len() >= 2)
        .map(|line| {
            let refs = unit.vertices(ids, line.coords().copied());
            Primitive::way(ids.next_id(), refs)
        })
        .collect();
    context
        .rules
        .apply_line_rules(context.attributes, context.geometry_key, &mut ways);
    for way in ways {
        unit.push(way);
    }
}

fn add_polygon(unit: &mut OutputUnit, context: ShellContext<'_>, ids: &mut IdAllocator, polygon: &Polygon<f64>) {
    let Some(outer) = ring_way(unit, ids, polygon.exterior()) else {
        return;
    };
    let mut inners: Vec<Primitive> = polygon
        .interiors()
        .iter()
        .filter_map(|ring| ring_way(unit, ids, ring))
        .collect();

    if inners.is_empty() {
        let mut outer_ways = [outer];
        context
            .rules
            .apply_outer_polygon_rules(context.attributes, context.geometry_key, &mut outer_ways);
        for way in outer_ways {
            unit.push(way);
        }
        return;
    }

    let mut members = vec![Member::way(outer.id(), OUTER_ROLE)];
    members.extend(inners.iter().map(|inner| Member::way(inner.id(), INNER_ROLE)));
    let mut multipolygon = Primitive::relation(ids.next_id(), members);
    multipolygon.add_tag(Tag::new(RELATION_TYPE_KEY, MULTIPOLYGON));
    let mut relations = [multipolygon];
    context
        .rules
        .apply_outer_polygon_rules(context.attributes, context.geometry_key, &mut relations);
    context
        .rules
        .apply_inner_polygon_rules(context.attributes, context.geometry_key, &mut inners);

    unit.push(outer);
    for inner in inners {
        unit.push(inner);
    }
    for relation in relations {
        unit.push(relation);
    }
}

/// Closed way over a ring; degenerate rings yield `None`.
fn ring_way(unit: &mut OutputUnit, ids: &mut IdAllocator, ring: &LineString<f64>) -> Option<Primitive> {
    if ring.0.len() < 3 {
        return None;
    }
    let mut refs = unit.vertices(ids, ring.coords().copied());
    if refs.first() != refs.last() {
        let first = *refs.first()?;
        refs.push(first);
    }
    Some(Primitive::way(ids.next_id(), refs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveKind;
    use geo::{line_string, point, polygon};
    use rstest::{fixture, rstest};

    const GEOMETRY_KEY: &str = "the_geom";

    #[fixture]
    fn rules() -> RuleSet {
        RuleSet::parse(
            "point,NAME,,name,-\n\
             line,NAME,,name,-\n\
             outer,LANDUSE,,landuse,-\n\
             inner,LANDUSE,,inner:landuse,-",
        )
        .rules
    }

    fn attributes() -> AttributeMap {
        [("NAME", "Spoorpark"), ("LANDUSE", "grass")].into_iter().collect()
    }

    fn build(geometry: Geometry<f64>, rules: &RuleSet) -> OutputUnit {
        let attributes = attributes();
        let context = ShellContext {
            rules,
            attributes: &attributes,
            geometry_key: GEOMETRY_KEY,
        };
        build_unit(&geometry, context, &mut IdAllocator::new()).expect("supported geometry")
    }

    #[rstest]
    fn line_becomes_tagged_way(rules: RuleSet) {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 1.0)];
        let unit = build(Geometry::LineString(line), &rules);
        assert_eq!(unit.class(), GeometryClass::Line);
        assert_eq!(unit.nodes().len(), 3);
        assert_eq!(unit.ways().len(), 1);
        assert_eq!(unit.ways()[0].tag("name"), Some("Spoorpark"));
        assert!(unit.nodes().iter().all(|node| !node.is_tagged()));
    }

    #[rstest]
    fn simple_polygon_becomes_closed_tagged_way(rules: RuleSet) {
        let area = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let unit = build(Geometry::Polygon(area), &rules);
        let way = &unit.ways()[0];
        assert_eq!(way.node_refs().first(), way.node_refs().last());
        assert_eq!(way.tag("landuse"), Some("grass"));
        assert!(unit.relations().is_empty());
    }

    #[rstest]
    fn polygon_with_hole_becomes_multipolygon(rules: RuleSet) {
        let area = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0)]],
        );
        let unit = build(Geometry::Polygon(area), &rules);
        assert_eq!(unit.ways().len(), 2);
        let relation = &unit.relations()[0];
        assert_eq!(relation.kind(), PrimitiveKind::Relation);
        assert_eq!(relation.tag("type"), Some("multipolygon"));
        assert_eq!(relation.tag("landuse"), Some("grass"));
        let roles: Vec<&str> = relation.members().iter().map(|member| member.role.as_str()).collect();
        assert_eq!(roles, vec!["outer", "inner"]);

        let outer = &unit.ways()[0];
        let inner = &unit.ways()[1];
        assert!(!outer.is_tagged());
        assert_eq!(inner.tag("inner:landuse"), Some("grass"));
    }

    #[rstest]
    fn multipoint_tags_every_node(rules: RuleSet) {
        let points = geo::MultiPoint::from(vec![point!(x: 0.0, y: 0.0), point!(x: 1.0, y: 1.0)]);
        let unit = build(Geometry::MultiPoint(points), &rules);
        assert_eq!(unit.nodes().len(), 2);
        assert!(unit.nodes().iter().all(|node| node.tag("name") == Some("Spoorpark")));
    }

    #[rstest]
    fn collections_are_unsupported(rules: RuleSet) {
        let attributes = attributes();
        let context = ShellContext {
            rules: &rules,
            attributes: &attributes,
            geometry_key: GEOMETRY_KEY,
        };
        let collection = Geometry::GeometryCollection(geo::GeometryCollection::default());
        assert!(build_unit(&collection, context, &mut IdAllocator::new()).is_none());
    }
}
