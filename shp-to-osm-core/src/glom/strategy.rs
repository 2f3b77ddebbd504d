//! Built-in glom merge strategies.

use std::collections::HashSet;
use std::fmt::Debug;

use crate::class::GeometryClass;
use crate::primitive::{IdAllocator, Member, Primitive, Tag};
use crate::shell::{INNER_ROLE, MULTIPOLYGON, OUTER_ROLE};
use crate::unit::{OutputUnit, RELATION_TYPE_KEY};

/// Relation type given to glommed point groups.
pub const COLLECTION: &str = "collection";

/// Merges the units of one glom group into a single unit.
pub trait GlomStrategy: Debug {
    /// Merge `units`, which share `glom_value` and a geometry class and are
    /// never empty.
    fn merge(&self, glom_value: &str, units: Vec<OutputUnit>, ids: &mut IdAllocator) -> OutputUnit;
}

/// Joins line ways whose ends meet into longer ways.
///
/// Tags are unioned with the first occurrence of each key kept. Ways that
/// never meet stay separate inside the merged unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinWays;

/// Gathers every ring of the group under one multipolygon relation that
/// carries the union of the group's area tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipolygonRelation;

/// Keeps every node and adds a `type=collection` relation over them that
/// carries the tags all members share.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionRelation;

fn absorb_all(glom_value: &str, units: Vec<OutputUnit>) -> OutputUnit {
    let class = units.first().map_or(GeometryClass::Point, OutputUnit::class);
    let mut merged = OutputUnit::new(class).with_glom_value(Some(glom_value.to_owned()));
    for unit in units {
        merged.absorb(unit);
    }
    merged
}

/// Append `tags` whose keys `target` does not hold yet.
fn union_tags(target: &mut Vec<Tag>, tags: impl IntoIterator<Item = Tag>) {
    let mut seen: HashSet<String> = target.iter().map(|tag| tag.key().to_owned()).collect();
    for tag in tags {
        if seen.insert(tag.key().to_owned()) {
            target.push(tag);
        }
    }
}

fn member_ids(relations: &[Primitive]) -> HashSet<i64> {
    relations
        .iter()
        .flat_map(Primitive::members)
        .map(|member| member.reference)
        .collect()
}

impl GlomStrategy for JoinWays {
    fn merge(&self, glom_value: &str, units: Vec<OutputUnit>, _ids: &mut IdAllocator) -> OutputUnit {
        let mut merged = absorb_all(glom_value, units);
        let members = member_ids(merged.relations());
        let (bound, free): (Vec<Primitive>, Vec<Primitive>) = merged
            .take_ways()
            .into_iter()
            .partition(|way| members.contains(&way.id()));
        for way in bound {
            merged.push(way);
        }
        for way in join_chains(free) {
            merged.push(way);
        }
        merged
    }
}

fn join_chains(ways: Vec<Primitive>) -> Vec<Primitive> {
    let mut chains: Vec<Primitive> = Vec::with_capacity(ways.len());
    for way in ways {
        let mut current = way;
        while let Some(position) = chains.iter().position(|chain| splice_refs(chain, &current).is_some()) {
            let chain = chains.remove(position);
            current = splice(chain, current);
        }
        chains.push(current);
    }
    chains
}

fn is_open(refs: &[i64]) -> bool {
    refs.len() >= 2 && refs.first() != refs.last()
}

/// Node sequence of `head` continued by `tail`, when their open ends meet.
fn splice_refs(head: &Primitive, tail: &Primitive) -> Option<Vec<i64>> {
    let (a, b) = (head.node_refs(), tail.node_refs());
    if !is_open(a) || !is_open(b) {
        return None;
    }
    let (a_first, a_last) = (a.first()?, a.last()?);
    let (b_first, b_last) = (b.first()?, b.last()?);
    let reversed = || b.iter().rev().copied();
    let joined: Vec<i64> = if a_last == b_first {
        a.iter().copied().chain(b.iter().copied().skip(1)).collect()
    } else if a_last == b_last {
        a.iter().copied().chain(reversed().skip(1)).collect()
    } else if a_first == b_last {
        b.iter().copied().chain(a.iter().copied().skip(1)).collect()
    } else if a_first == b_first {
        reversed().chain(a.iter().copied().skip(1)).collect()
    } else {
        return None;
    };
    Some(joined)
}

fn splice(mut head: Primitive, mut tail: Primitive) -> Primitive {
    let refs = splice_refs(&head, &tail).unwrap_or_else(|| head.node_refs().to_vec());
    let mut tags = head.take_tags();
    union_tags(&mut tags, tail.take_tags());
    let mut joined = Primitive::way(head.id(), refs);
    for tag in tags {
        joined.add_tag(tag);
    }
    joined
}

impl GlomStrategy for MultipolygonRelation {
    fn merge(&self, glom_value: &str, units: Vec<OutputUnit>, ids: &mut IdAllocator) -> OutputUnit {
        let mut merged = absorb_all(glom_value, units);
        let free_role = if merged.class() == GeometryClass::InnerRing {
            INNER_ROLE
        } else {
            OUTER_ROLE
        };

        let mut members: Vec<Member> = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();
        let mut kept: Vec<Primitive> = Vec::new();
        for mut relation in merged.take_relations() {
            if relation.has_tag(RELATION_TYPE_KEY, MULTIPOLYGON) {
                members.extend(relation.members().iter().cloned());
                union_tags(
                    &mut tags,
                    relation
                        .take_tags()
                        .into_iter()
                        .filter(|tag| tag.key() != RELATION_TYPE_KEY),
                );
            } else {
                kept.push(relation);
            }
        }

        let bound: HashSet<i64> = members
            .iter()
            .map(|member| member.reference)
            .chain(member_ids(&kept))
            .collect();
        let mut ways = merged.take_ways();
        for way in ways.iter_mut().filter(|way| !bound.contains(&way.id())) {
            members.push(Member::way(way.id(), free_role));
            union_tags(&mut tags, way.take_tags());
        }
        for way in ways {
            merged.push(way);
        }
        for relation in kept {
            merged.push(relation);
        }

        if !members.is_empty() {
            let mut relation = Primitive::relation(ids.next_id(), members);
            relation.add_tag(Tag::new(RELATION_TYPE_KEY, MULTIPOLYGON));
            for tag in tags {
                relation.add_tag(tag);
            }
            merged.push(relation);
        }
        merged
    }
}

impl GlomStrategy for CollectionRelation {
    fn merge(&self, glom_value: &str, units: Vec<OutputUnit>, ids: &mut IdAllocator) -> OutputUnit {
        let mut merged = absorb_all(glom_value, units);
        let Some((first, rest)) = merged.nodes().split_first() else {
            return merged;
        };
        let shared: Vec<Tag> = first
            .tags()
            .iter()
            .filter(|tag| rest.iter().all(|node| node.has_tag(tag.key(), tag.value())))
            .cloned()
            .collect();
        let members: Vec<Member> = merged
            .nodes()
            .iter()
            .map(|node| Member::node(node.id(), ""))
            .collect();

        let mut relation = Primitive::relation(ids.next_id(), members);
        relation.add_tag(Tag::new(RELATION_TYPE_KEY, COLLECTION));
        for tag in shared.into_iter().filter(|tag| tag.key() != RELATION_TYPE_KEY) {
            relation.add_tag(tag);
        }
        merged.push(relation);
        merged
    }
}
