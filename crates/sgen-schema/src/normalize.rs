//! Discriminator normalization
//!
//! Rewrites the loaded graph so that every polymorphic hierarchy is expressed
//! the same way: a named base definition carrying the discriminator, and
//! derived schemas linked to it through an `allOf` reference.
//!
//! ```text
//!  pass 1   identity -> definition name lookup over the whole definition set
//!  pass 2   post-order walk from the root and every definition
//!             anchor found  -> materialize / reuse base definition, add edges
//!             other         -> strip discriminator property from derived
//!  pass 3   strip every ancestor's discriminator property from each schema
//! ```
//!
//! Every rewrite is idempotent: a second run over a normalized graph finds
//! no anchors left to materialize, no missing edges, and nothing to strip.

use crate::graph::{Discriminator, Edge, SchemaGraph, SchemaId, SchemaNode};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Name hint used for anchors with no property or definition name
pub const ANONYMOUS_ANCHOR: &str = "Anonymous";

/// Counts of the rewrites performed by [`normalize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// New base definitions created for inline union anchors
    pub anchors_synthesized: usize,
    /// Inline discriminator objects registered as definitions in place
    pub anchors_promoted: usize,
    /// `allOf` inheritance references added
    pub edges_added: usize,
    /// Discriminator properties removed from schemas
    pub properties_stripped: usize,
    /// Discriminator mapping entries recovered from stripped properties
    pub mappings_inferred: usize,
}

impl NormalizeReport {
    pub fn is_noop(&self) -> bool {
        *self == NormalizeReport::default()
    }
}

/// Normalize discriminator hierarchies in place
pub fn normalize(graph: &mut SchemaGraph) -> NormalizeReport {
    let lookup = DefinitionLookup::build(graph);
    let mut materializer = Materializer {
        graph,
        lookup,
        visited: HashSet::new(),
        report: NormalizeReport::default(),
    };
    materializer.run();
    let mut report = materializer.report;
    strip_inherited_discriminators(graph, &mut report);
    debug!(
        anchors_synthesized = report.anchors_synthesized,
        anchors_promoted = report.anchors_promoted,
        edges_added = report.edges_added,
        properties_stripped = report.properties_stripped,
        mappings_inferred = report.mappings_inferred,
        "discriminator normalization complete"
    );
    report
}

/// Reverse lookup from schema identity to definition name
#[derive(Debug, Default)]
struct DefinitionLookup {
    names: HashMap<SchemaId, String>,
}

impl DefinitionLookup {
    fn build(graph: &SchemaGraph) -> Self {
        let names = graph
            .definitions()
            .iter()
            .map(|(name, id)| (*id, name.clone()))
            .collect();
        Self { names }
    }

    fn name_of(&self, id: SchemaId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    fn insert(&mut self, id: SchemaId, name: String) {
        self.names.insert(id, name);
    }
}

/// Position from which a node is visited
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Root,
    Definition,
    Property(String),
    Items,
    Other,
}

struct Materializer<'g> {
    graph: &'g mut SchemaGraph,
    lookup: DefinitionLookup,
    visited: HashSet<SchemaId>,
    report: NormalizeReport,
}

impl Materializer<'_> {
    fn run(&mut self) {
        let root = self.graph.root();
        self.visit(root, Slot::Root);
        let definitions: Vec<SchemaId> = self.graph.definitions().values().copied().collect();
        for id in definitions {
            self.visit(id, Slot::Definition);
        }
    }

    fn visit(&mut self, id: SchemaId, slot: Slot) {
        if !self.visited.insert(id) {
            return;
        }
        for (child, edge) in self.graph.children(id) {
            let child_slot = match edge {
                Edge::Property(name) => Slot::Property(name),
                Edge::Items => Slot::Items,
                _ => Slot::Other,
            };
            self.visit(child, child_slot);
        }
        self.process(id, &slot);
    }

    fn process(&mut self, id: SchemaId, slot: &Slot) {
        let actual = self.graph.actual(id);
        let Some(discriminator) = self.graph.node(actual).discriminator.clone() else {
            return;
        };

        if actual == self.graph.root() || self.lookup.name_of(actual).is_some() {
            trace!(%id, slot = ?slot, "definition anchor");
            let members = self.take_union_members(actual);
            let targets = with_mapping_targets(members, &discriminator);
            self.add_edges(&targets, actual);
            return;
        }

        let hint = match slot {
            Slot::Property(name) => name.clone(),
            Slot::Items => self
                .lookup
                .name_of(id)
                .unwrap_or(ANONYMOUS_ANCHOR)
                .to_string(),
            Slot::Root | Slot::Definition | Slot::Other => {
                self.strip_from_derived(actual, &discriminator.property_name);
                return;
            }
        };
        trace!(%id, hint = %hint, "inline anchor");

        let members = self.non_null_union_members(actual);
        match self.graph.definition(&hint) {
            None if members.is_empty() => {
                let name = self.graph.define(&hint, actual);
                self.lookup.insert(actual, name);
                self.report.anchors_promoted += 1;
                let targets = with_mapping_targets(Vec::new(), &discriminator);
                self.add_edges(&targets, actual);
                return;
            }
            None => {
                let source = self.graph.node(actual);
                let base = SchemaNode {
                    description: source.description.clone(),
                    discriminator: Some(discriminator.clone()),
                    is_abstract: source.is_abstract,
                    ..SchemaNode::default()
                };
                let base = self.graph.add(base);
                let name = self.graph.define(&hint, base);
                self.lookup.insert(base, name);
                self.report.anchors_synthesized += 1;
                let targets = with_mapping_targets(members, &discriminator);
                self.add_edges(&targets, base);
            }
            Some(existing) => {
                let targets = with_mapping_targets(members, &discriminator);
                self.add_edges(&targets, existing);
                let pending = self.take_union_members(existing);
                self.add_edges(&pending, existing);
            }
        }

        let transient = self.graph.node_mut(actual);
        transient.discriminator = None;
        transient.is_abstract = false;
    }

    fn non_null_union_members(&self, id: SchemaId) -> Vec<SchemaId> {
        self.graph
            .node(id)
            .one_of
            .iter()
            .copied()
            .filter(|member| !self.graph.is_null_schema(*member))
            .collect()
    }

    /// Remove and return the non-null `oneOf` members of a definition anchor
    fn take_union_members(&mut self, id: SchemaId) -> Vec<SchemaId> {
        let members = self.non_null_union_members(id);
        if !members.is_empty() {
            let graph = &*self.graph;
            let nulls: Vec<SchemaId> = graph
                .node(id)
                .one_of
                .iter()
                .copied()
                .filter(|member| graph.is_null_schema(*member))
                .collect();
            self.graph.node_mut(id).one_of = nulls;
        }
        members
    }

    /// Link every member to `base` through an `allOf` reference, once
    fn add_edges(&mut self, members: &[SchemaId], base: SchemaId) {
        for member in members {
            let target = self.graph.actual(*member);
            if target == base || self.graph.is_null_schema(target) {
                continue;
            }
            let node = self.graph.node(target);
            if !(node.types.is_empty() || node.has_object_shape()) {
                continue;
            }
            if self.graph.ancestors(base).contains(&target) {
                continue;
            }
            let linked = node
                .all_of
                .iter()
                .any(|existing| self.graph.actual(*existing) == base);
            if linked {
                continue;
            }
            let edge = self.graph.add(SchemaNode::reference_to(base));
            self.graph.node_mut(target).all_of.push(edge);
            self.report.edges_added += 1;
            trace!(derived = %target, base = %base, "added inheritance edge");
        }
    }

    fn strip_from_derived(&mut self, base: SchemaId, property: &str) {
        for derived in self.graph.derived_of(base) {
            strip_property(self.graph, derived, base, property, &mut self.report);
        }
    }
}

fn with_mapping_targets(mut members: Vec<SchemaId>, discriminator: &Discriminator) -> Vec<SchemaId> {
    for target in discriminator.mapping.values() {
        if !members.contains(target) {
            members.push(*target);
        }
    }
    members
}

/// Remove each ancestor's (and the schema's own) discriminator property
fn strip_inherited_discriminators(graph: &mut SchemaGraph, report: &mut NormalizeReport) {
    let ids: Vec<SchemaId> = graph.ids().collect();
    for id in ids {
        if graph.node(id).reference.is_some() || graph.node(id).properties.is_empty() {
            continue;
        }
        let mut owners = vec![id];
        owners.extend(graph.ancestors(id));
        for owner in owners {
            let property = graph
                .node(owner)
                .discriminator
                .as_ref()
                .map(|d| d.property_name.clone());
            if let Some(property) = property {
                strip_property(graph, id, owner, &property, report);
            }
        }
    }
}

fn strip_property(
    graph: &mut SchemaGraph,
    target: SchemaId,
    owner: SchemaId,
    property: &str,
    report: &mut NormalizeReport,
) {
    let Some(schema) = graph.node(target).properties.get(property).copied() else {
        return;
    };
    if target != owner
        && let Some(value) = single_literal(graph, schema)
        && let Some(discriminator) = graph.node_mut(owner).discriminator.as_mut()
        && discriminator.value_for(target).is_none()
        && !discriminator.mapping.contains_key(&value)
    {
        discriminator.mapping.insert(value, target);
        report.mappings_inferred += 1;
    }
    let node = graph.node_mut(target);
    node.properties.shift_remove(property);
    node.required.retain(|name| name != property);
    report.properties_stripped += 1;
    trace!(schema = %target, property, "stripped discriminator property");
}

/// The only string a property schema admits (`const` or one-value `enum`)
fn single_literal(graph: &SchemaGraph, id: SchemaId) -> Option<String> {
    let node = graph.node(graph.actual(id));
    match (&node.constant, node.enumeration.as_slice()) {
        (Some(Value::String(value)), _) => Some(value.clone()),
        (None, [Value::String(value)]) => Some(value.clone()),
        _ => None,
    }
}
