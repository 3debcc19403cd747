//! Arena-backed schema graph
//!
//! Every schema location in the loaded documents becomes one [`SchemaNode`]
//! addressed by a stable [`SchemaId`]. Identity comparisons throughout the
//! generator are comparisons of ids, never of content.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Extension key carrying a pre-resolved external type name
pub const TYPE_NAME_EXTENSION: &str = "x-sgen-typeName";

/// Stable identity of a node in a [`SchemaGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// JSON Schema `type` keyword values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "string" => Some(JsonType::String),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            _ => None,
        }
    }
}

/// `additionalProperties` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(SchemaId),
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        AdditionalProperties::Allowed(true)
    }
}

/// Discriminator descriptor: property name plus value-to-schema mapping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Discriminator {
    pub property_name: String,
    pub mapping: IndexMap<String, SchemaId>,
}

impl Discriminator {
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            mapping: IndexMap::new(),
        }
    }

    /// Mapping key whose target is `schema`, if any
    pub fn value_for(&self, schema: SchemaId) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(_, target)| **target == schema)
            .map(|(value, _)| value.as_str())
    }
}

/// A single schema location
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    pub types: Vec<JsonType>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Target of a `$ref`
    pub reference: Option<SchemaId>,
    pub properties: IndexMap<String, SchemaId>,
    pub required: Vec<String>,
    pub items: Option<SchemaId>,
    pub additional_properties: AdditionalProperties,
    pub all_of: Vec<SchemaId>,
    pub one_of: Vec<SchemaId>,
    pub any_of: Vec<SchemaId>,
    pub enumeration: Vec<Value>,
    /// `x-enumNames` identifiers, parallel to `enumeration`
    pub enum_names: Vec<String>,
    pub constant: Option<Value>,
    pub default: Option<Value>,
    pub discriminator: Option<Discriminator>,
    pub is_abstract: bool,
    /// `x-*` keys not interpreted by the loader
    pub extensions: IndexMap<String, Value>,
}

impl SchemaNode {
    /// A node that only refers to `target`
    pub fn reference_to(target: SchemaId) -> Self {
        Self {
            reference: Some(target),
            ..Self::default()
        }
    }

    pub fn has_type(&self, ty: JsonType) -> bool {
        self.types.contains(&ty)
    }

    /// Declared types other than `null`
    pub fn non_null_types(&self) -> impl Iterator<Item = JsonType> + '_ {
        self.types.iter().copied().filter(|t| *t != JsonType::Null)
    }

    pub fn is_enumeration(&self) -> bool {
        !self.enumeration.is_empty()
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// Type name supplied out of band through [`TYPE_NAME_EXTENSION`]
    pub fn external_type_name(&self) -> Option<&str> {
        self.extensions
            .get(TYPE_NAME_EXTENSION)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Whether the node is shaped like an object type
    pub fn has_object_shape(&self) -> bool {
        self.has_type(JsonType::Object)
            || !self.properties.is_empty()
            || self.discriminator.is_some()
            || self.is_abstract
    }
}

/// The schema arena plus the flat definition set
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    root: SchemaId,
    definitions: IndexMap<String, SchemaId>,
    definition_index: HashMap<SchemaId, usize>,
}

impl Default for SchemaGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGraph {
    /// Create a graph containing only an empty root schema
    pub fn new() -> Self {
        Self {
            nodes: vec![SchemaNode::default()],
            root: SchemaId(0),
            definitions: IndexMap::new(),
            definition_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> SchemaId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order
    pub fn ids(&self) -> impl Iterator<Item = SchemaId> + use<> {
        (0..self.nodes.len()).map(SchemaId)
    }

    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Allocate a node
    pub fn add(&mut self, node: SchemaNode) -> SchemaId {
        self.nodes.push(node);
        SchemaId(self.nodes.len() - 1)
    }

    /// Top-level definitions in declaration order
    pub fn definitions(&self) -> &IndexMap<String, SchemaId> {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<SchemaId> {
        self.definitions.get(name).copied()
    }

    /// Name under which `id` is registered as a definition
    pub fn definition_name(&self, id: SchemaId) -> Option<&str> {
        self.definition_index
            .get(&id)
            .and_then(|index| self.definitions.get_index(*index))
            .map(|(name, _)| name.as_str())
    }

    /// Register `id` as a definition, returning the name actually used
    ///
    /// A name already bound to a different node receives the first free
    /// ordinal suffix starting at 2.
    pub fn define(&mut self, name: &str, id: SchemaId) -> String {
        if let Some(existing) = self.definition_name(id) {
            return existing.to_string();
        }
        let mut candidate = name.to_string();
        let mut ordinal = 1;
        while self.definitions.contains_key(&candidate) {
            ordinal += 1;
            candidate = format!("{name}{ordinal}");
        }
        let (index, _) = self.definitions.insert_full(candidate.clone(), id);
        self.definition_index.insert(id, index);
        candidate
    }

    /// Whether `id` is a bare `allOf: [{$ref}]` wrapper that should be
    /// treated as the reference it wraps
    pub fn is_reference_wrapper(&self, id: SchemaId) -> bool {
        let node = self.node(id);
        node.reference.is_none()
            && node.all_of.len() == 1
            && self.node(node.all_of[0]).reference.is_some()
            && node.types.is_empty()
            && node.properties.is_empty()
            && node.one_of.is_empty()
            && node.any_of.is_empty()
            && node.items.is_none()
            && node.enumeration.is_empty()
            && node.discriminator.is_none()
            && !node.is_abstract
            && node.additional_properties == AdditionalProperties::Allowed(true)
            && self.definition_name(id).is_none()
            && id != self.root
    }

    /// Follow `$ref` links (and reference wrappers) to the concrete schema
    pub fn actual(&self, id: SchemaId) -> SchemaId {
        let mut current = id;
        for _ in 0..=self.nodes.len() {
            let node = self.node(current);
            if let Some(target) = node.reference {
                current = target;
            } else if self.is_reference_wrapper(current) {
                current = node.all_of[0];
            } else {
                return current;
            }
        }
        current
    }

    /// Base schema of `id`: the first `allOf` member that is a reference
    pub fn inherited(&self, id: SchemaId) -> Option<SchemaId> {
        let actual = self.actual(id);
        self.node(actual)
            .all_of
            .iter()
            .find(|member| {
                self.node(**member).reference.is_some() || self.is_reference_wrapper(**member)
            })
            .map(|member| self.actual(*member))
            .filter(|base| *base != actual)
    }

    /// Transitive base chain of `id`, nearest first
    pub fn ancestors(&self, id: SchemaId) -> Vec<SchemaId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([self.actual(id)]);
        let mut current = self.inherited(id);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.inherited(base);
        }
        chain
    }

    /// Own properties plus those of non-inherited `allOf` members
    pub fn actual_properties(&self, id: SchemaId) -> IndexMap<String, SchemaId> {
        let mut properties = IndexMap::new();
        let mut seen = HashSet::new();
        self.collect_properties(self.actual(id), &mut properties, &mut seen);
        properties
    }

    fn collect_properties(
        &self,
        id: SchemaId,
        properties: &mut IndexMap<String, SchemaId>,
        seen: &mut HashSet<SchemaId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        let node = self.node(id);
        for (name, property) in &node.properties {
            properties.entry(name.clone()).or_insert(*property);
        }
        let inherited = self.inherited(id);
        for member in &node.all_of {
            let member = self.actual(*member);
            if Some(member) != inherited {
                self.collect_properties(member, properties, seen);
            }
        }
    }

    /// Whether `property` is required by `id` or a merged `allOf` member
    pub fn is_required(&self, id: SchemaId, property: &str) -> bool {
        let actual = self.actual(id);
        let node = self.node(actual);
        if node.is_required(property) {
            return true;
        }
        let inherited = self.inherited(actual);
        node.all_of
            .iter()
            .map(|member| self.actual(*member))
            .filter(|member| Some(*member) != inherited && *member != actual)
            .any(|member| self.node(member).is_required(property))
    }

    /// `oneOf` members of the actual schema, or `anyOf` when `oneOf` is empty
    pub fn union_members(&self, id: SchemaId) -> &[SchemaId] {
        let node = self.node(self.actual(id));
        if node.one_of.is_empty() {
            &node.any_of
        } else {
            &node.one_of
        }
    }

    /// Whether the schema only admits `null`
    pub fn is_null_schema(&self, id: SchemaId) -> bool {
        let node = self.node(self.actual(id));
        node.types == [JsonType::Null] && node.properties.is_empty()
    }

    /// Whether `null` is an admissible value along the reference chain
    pub fn is_nullable(&self, id: SchemaId) -> bool {
        let mut current = id;
        let mut seen = HashSet::new();
        while seen.insert(current) {
            let node = self.node(current);
            if node.has_type(JsonType::Null)
                || node
                    .one_of
                    .iter()
                    .chain(node.any_of.iter())
                    .any(|member| self.is_null_schema(*member))
            {
                return true;
            }
            match node.reference {
                Some(target) => current = target,
                None if self.is_reference_wrapper(current) => current = node.all_of[0],
                None => break,
            }
        }
        false
    }

    /// Non-reference nodes whose base is `base`, definitions first
    pub fn derived_of(&self, base: SchemaId) -> Vec<SchemaId> {
        let mut derived: Vec<SchemaId> = Vec::new();
        let candidates = self
            .definitions
            .values()
            .copied()
            .chain(self.ids())
            .collect::<Vec<_>>();
        for id in candidates {
            if derived.contains(&id)
                || self.node(id).reference.is_some()
                || self.is_reference_wrapper(id)
            {
                continue;
            }
            if self.inherited(id) == Some(base) {
                derived.push(id);
            }
        }
        derived
    }

    /// Every node reachable from `id` through structural edges, `id` included
    pub fn reachable_from(&self, id: SchemaId) -> Vec<SchemaId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev().map(|(child, _)| child));
        }
        order
    }

    /// Direct structural children with the edge through which they are reached
    pub fn children(&self, id: SchemaId) -> Vec<(SchemaId, Edge)> {
        let node = self.node(id);
        let mut children = Vec::new();
        if let Some(target) = node.reference {
            children.push((target, Edge::Reference));
        }
        for (name, property) in &node.properties {
            children.push((*property, Edge::Property(name.clone())));
        }
        if let Some(items) = node.items {
            children.push((items, Edge::Items));
        }
        if let AdditionalProperties::Schema(schema) = node.additional_properties {
            children.push((schema, Edge::AdditionalProperties));
        }
        for member in node.all_of.iter().chain(&node.one_of).chain(&node.any_of) {
            children.push((*member, Edge::Union));
        }
        if let Some(discriminator) = &node.discriminator {
            for target in discriminator.mapping.values() {
                children.push((*target, Edge::Mapping));
            }
        }
        children
    }
}

/// How a child node is reached from its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Reference,
    Property(String),
    Items,
    AdditionalProperties,
    Union,
    Mapping,
}
