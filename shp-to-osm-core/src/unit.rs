//! Output units: every primitive derived from one input record.
//!
//! A unit is the smallest thing the output assembler places in a file, so a
//! way always lands next to the nodes it references. Nodes are deduplicated by
//! exact coordinate within a unit and never shared between units.

use std::collections::{HashMap, HashSet};

use geo::Coord;

use crate::class::GeometryClass;
use crate::primitive::{IdAllocator, Primitive, PrimitiveKind, Shape};
use crate::rules::RuleSet;

/// Tag key that names a relation's type.
pub const RELATION_TYPE_KEY: &str = "type";

/// Primitives produced from one record or one glommed group.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUnit {
    class: GeometryClass,
    glom_value: Option<String>,
    nodes: Vec<Primitive>,
    ways: Vec<Primitive>,
    relations: Vec<Primitive>,
    node_index: HashMap<(u64, u64), i64>,
}

impl OutputUnit {
    /// An empty unit for a record of `class`.
    #[must_use]
    pub fn new(class: GeometryClass) -> Self {
        Self {
            class,
            glom_value: None,
            nodes: Vec::new(),
            ways: Vec::new(),
            relations: Vec::new(),
            node_index: HashMap::new(),
        }
    }

    /// Attach the canonical value of the glom key.
    #[must_use]
    pub fn with_glom_value(mut self, glom_value: Option<String>) -> Self {
        self.glom_value = glom_value;
        self
    }

    /// Geometry class of the source record.
    #[must_use]
    pub const fn class(&self) -> GeometryClass {
        self.class
    }

    /// Canonical value of the glom key, if one was recorded.
    #[must_use]
    pub fn glom_value(&self) -> Option<&str> {
        self.glom_value.as_deref()
    }

    /// Nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[Primitive] {
        &self.nodes
    }

    /// Ways in creation order.
    #[must_use]
    pub fn ways(&self) -> &[Primitive] {
        &self.ways
    }

    /// Relations in creation order.
    #[must_use]
    pub fn relations(&self) -> &[Primitive] {
        &self.relations
    }

    /// Every primitive: nodes, then ways, then relations.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.nodes
            .iter()
            .chain(&self.ways)
            .chain(&self.relations)
    }

    /// Number of primitives in the unit.
    #[must_use]
    pub const fn element_count(&self) -> usize {
        self.nodes.len() + self.ways.len() + self.relations.len()
    }

    /// Whether the unit holds no primitives.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// Add a primitive to the list matching its kind.
    pub fn push(&mut self, primitive: Primitive) {
        match primitive.kind() {
            PrimitiveKind::Node => {
                if let Some(location) = primitive.location() {
                    self.node_index
                        .entry(coord_key(location))
                        .or_insert_with(|| primitive.id());
                }
                self.nodes.push(primitive);
            }
            PrimitiveKind::Way => self.ways.push(primitive),
            PrimitiveKind::Relation => self.relations.push(primitive),
        }
    }

    /// Identifier of the node at `location`, creating an untagged node when
    /// the unit has none there yet.
    pub fn vertex(&mut self, ids: &mut IdAllocator, location: Coord<f64>) -> i64 {
        if let Some(id) = self.node_index.get(&coord_key(location)) {
            return *id;
        }
        let id = ids.next_id();
        self.push(Primitive::node(id, location));
        id
    }

    /// Node identifiers for a sequence of vertices.
    pub fn vertices(&mut self, ids: &mut IdAllocator, coords: impl IntoIterator<Item = Coord<f64>>) -> Vec<i64> {
        coords
            .into_iter()
            .map(|location| self.vertex(ids, location))
            .collect()
    }

    /// Location of a node held by this unit.
    #[must_use]
    pub fn node_location(&self, id: i64) -> Option<Coord<f64>> {
        self.nodes
            .iter()
            .find(|node| node.id() == id)
            .and_then(Primitive::location)
    }

    /// Move every primitive of `other` into this unit.
    ///
    /// Untagged nodes of `other` that sit on a coordinate this unit already
    /// holds are replaced by the existing node, and the ways and relations of
    /// `other` are rewritten to match.
    pub fn absorb(&mut self, other: Self) {
        let mut replaced: HashMap<i64, i64> = HashMap::new();
        let (nodes, ways, relations) = other.into_parts();
        for node in nodes {
            let existing = node
                .location()
                .filter(|_| !node.is_tagged())
                .and_then(|location| self.node_index.get(&coord_key(location)).copied());
            match existing {
                Some(id) => {
                    replaced.insert(node.id(), id);
                }
                None => self.push(node),
            }
        }
        for mut primitive in ways.into_iter().chain(relations) {
            match primitive.shape_mut() {
                Shape::Way(refs) => {
                    for reference in refs.iter_mut() {
                        if let Some(id) = replaced.get(reference) {
                            *reference = *id;
                        }
                    }
                }
                Shape::Relation(members) => {
                    for member in members.iter_mut().filter(|member| member.kind == PrimitiveKind::Node) {
                        if let Some(id) = replaced.get(&member.reference) {
                            member.reference = *id;
                        }
                    }
                }
                Shape::Node(_) => {}
            }
            self.push(primitive);
        }
    }

    pub(crate) fn take_ways(&mut self) -> Vec<Primitive> {
        std::mem::take(&mut self.ways)
    }

    pub(crate) fn take_relations(&mut self) -> Vec<Primitive> {
        std::mem::take(&mut self.relations)
    }

    /// Split into nodes, ways and relations.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Primitive>, Vec<Primitive>, Vec<Primitive>) {
        (self.nodes, self.ways, self.relations)
    }

    /// Drop every primitive vetoed by `rules`, along with what depends on it.
    pub fn retain_included(&mut self, rules: &RuleSet) {
        let doomed: HashSet<i64> = self
            .primitives()
            .filter(|primitive| !rules.includes(primitive))
            .map(Primitive::id)
            .collect();
        self.prune(doomed);
    }

    /// Drop relations whose only tag is `type`, then untagged ways that are
    /// no longer relation members, then the vertices only those ways used.
    ///
    /// Tagged nodes and tagged ways always survive.
    pub fn retain_tagged_ways(&mut self) {
        self.relations.retain(|relation| {
            !relation
                .tags()
                .iter()
                .all(|tag| tag.key() == RELATION_TYPE_KEY)
        });
        let members: HashSet<i64> = self
            .relations
            .iter()
            .flat_map(Primitive::members)
            .map(|member| member.reference)
            .collect();
        let (kept, dropped): (Vec<Primitive>, Vec<Primitive>) = std::mem::take(&mut self.ways)
            .into_iter()
            .partition(|way| way.is_tagged() || members.contains(&way.id()));
        self.ways = kept;

        let orphan_candidates: HashSet<i64> = dropped
            .iter()
            .flat_map(|way| way.node_refs().iter().copied())
            .collect();
        let referenced: HashSet<i64> = self
            .ways
            .iter()
            .flat_map(|way| way.node_refs().iter().copied())
            .chain(members)
            .collect();
        self.nodes.retain(|node| {
            node.is_tagged() || !orphan_candidates.contains(&node.id()) || referenced.contains(&node.id())
        });
        let surviving: HashSet<i64> = self.nodes.iter().map(Primitive::id).collect();
        self.node_index.retain(|_, id| surviving.contains(id));
    }

    /// Remove `doomed` primitives. A relation falls with any of its members
    /// and takes its members with it; vertex nodes fall once no surviving way
    /// references them.
    fn prune(&mut self, mut doomed: HashSet<i64>) {
        if doomed.is_empty() {
            return;
        }
        for relation in &self.relations {
            let members = relation.members();
            if doomed.contains(&relation.id())
                || members.iter().any(|member| doomed.contains(&member.reference))
            {
                doomed.insert(relation.id());
                doomed.extend(members.iter().map(|member| member.reference));
            }
        }

        let vertices: HashSet<i64> = self
            .ways
            .iter()
            .flat_map(|way| way.node_refs().iter().copied())
            .collect();
        self.relations.retain(|relation| !doomed.contains(&relation.id()));
        self.ways.retain(|way| !doomed.contains(&way.id()));

        let mut referenced: HashSet<i64> = self
            .ways
            .iter()
            .flat_map(|way| way.node_refs().iter().copied())
            .collect();
        referenced.extend(
            self.relations
                .iter()
                .flat_map(Primitive::members)
                .filter(|member| member.kind == PrimitiveKind::Node)
                .map(|member| member.reference),
        );
        self.nodes.retain(|node| {
            let id = node.id();
            !doomed.contains(&id) && (!vertices.contains(&id) || referenced.contains(&id))
        });
        let surviving: HashSet<i64> = self.nodes.iter().map(Primitive::id).collect();
        self.node_index.retain(|_, id| surviving.contains(id));
    }
}

fn coord_key(location: Coord<f64>) -> (u64, u64) {
    (location.x.to_bits(), location.y.to_bits())
}
