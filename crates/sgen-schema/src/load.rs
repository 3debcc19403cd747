//! Schema document loading
//!
//! Documents are held in a [`DocumentSet`] keyed by absolute URL. Loading
//! walks every schema location reachable from the root document with a work
//! queue, allocating exactly one arena node per (document, JSON pointer) so
//! that the same location always has the same identity.
//!
//! Definitions found anywhere (`definitions`, `$defs`, nested containers, or
//! fragments of other documents reached through `$ref`) are flattened into
//! the graph's single definition map.

use crate::graph::{
    AdditionalProperties, Discriminator, JsonType, SchemaGraph, SchemaId, SchemaNode,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use sgen_core::{SgenError, SgenResult};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, trace, warn};
use url::Url;

const DEFINITION_CONTAINERS: [&str; 2] = ["definitions", "$defs"];

/// Serialized form of a schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Detect,
}

impl DocumentFormat {
    /// Pick a format from a file name or URL path extension
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            DocumentFormat::Yaml
        } else if lower.ends_with(".json") {
            DocumentFormat::Json
        } else {
            DocumentFormat::Detect
        }
    }
}

/// Parse schema document text
pub fn parse_document(text: &str, format: DocumentFormat) -> SgenResult<Value> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        DocumentFormat::Detect => match serde_json::from_str(text) {
            Ok(value) => Ok(value),
            Err(json_err) => serde_yaml::from_str(text).map_err(|yaml_err| {
                SgenError::SchemaLoad(format!(
                    "document is neither JSON ({json_err}) nor YAML ({yaml_err})"
                ))
            }),
        },
    }
}

/// Base URL used for documents that have no location of their own
pub fn default_base_url() -> Url {
    #[allow(clippy::unwrap_used)] // Safe: constant, well-formed URL
    Url::parse("file:///schema.json").unwrap()
}

/// Root document plus every document it references
#[derive(Debug, Clone)]
pub struct DocumentSet {
    root: Url,
    documents: HashMap<Url, Value>,
}

impl DocumentSet {
    pub fn new(root: Url, document: Value) -> Self {
        let root = without_fragment(&root);
        let mut documents = HashMap::new();
        documents.insert(root.clone(), document);
        Self { root, documents }
    }

    pub fn root_url(&self) -> &Url {
        &self.root
    }

    pub fn insert(&mut self, url: Url, document: Value) {
        self.documents.insert(without_fragment(&url), document);
    }

    pub fn get(&self, url: &Url) -> Option<&Value> {
        self.documents.get(&without_fragment(url))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents referenced by `$ref` that are not yet in the set
    pub fn missing_documents(&self) -> Vec<Url> {
        let mut missing = Vec::new();
        for (url, document) in &self.documents {
            let mut refs = Vec::new();
            collect_refs(document, &mut refs);
            for reference in refs {
                let Ok(target) = url.join(reference) else {
                    continue;
                };
                let target = without_fragment(&target);
                if !self.documents.contains_key(&target) && !missing.contains(&target) {
                    missing.push(target);
                }
            }
        }
        missing.sort();
        missing
    }
}

fn collect_refs<'a>(value: &'a Value, refs: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) if !reference.starts_with('#') => {
                        refs.push(reference);
                    }
                    _ => collect_refs(child, refs),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, refs)),
        _ => {}
    }
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

impl SchemaGraph {
    /// Build a graph from a single in-memory document
    pub fn from_value(document: Value) -> SgenResult<Self> {
        Self::from_documents(&DocumentSet::new(default_base_url(), document))
    }

    /// Build a graph from JSON or YAML text
    pub fn from_text(text: &str) -> SgenResult<Self> {
        Self::from_value(parse_document(text, DocumentFormat::Detect)?)
    }

    /// Build a graph from a document set
    pub fn from_documents(documents: &DocumentSet) -> SgenResult<Self> {
        let mut loader = Loader::new(documents);
        loader.run()?;
        let graph = loader.finish()?;
        debug!(
            nodes = graph.len(),
            definitions = graph.definitions().len(),
            documents = documents.len(),
            "schema graph loaded"
        );
        Ok(graph)
    }
}

type Location = (Url, String);

struct Loader<'a> {
    documents: &'a DocumentSet,
    graph: SchemaGraph,
    index: HashMap<Location, SchemaId>,
    locations: Vec<Location>,
    queue: VecDeque<SchemaId>,
}

impl<'a> Loader<'a> {
    fn new(documents: &'a DocumentSet) -> Self {
        let graph = SchemaGraph::new();
        let root: Location = (documents.root_url().clone(), String::new());
        let mut index = HashMap::new();
        index.insert(root.clone(), graph.root());
        Self {
            documents,
            graph,
            index,
            locations: vec![root],
            queue: VecDeque::from([SchemaId(0)]),
        }
    }

    fn run(&mut self) -> SgenResult<()> {
        while let Some(id) = self.queue.pop_front() {
            let (url, pointer) = self.locations[id.0].clone();
            let documents = self.documents;
            let document = documents
                .get(&url)
                .ok_or_else(|| SgenError::UnresolvedReference {
                    reference: url.to_string(),
                })?;
            let value = document
                .pointer(&pointer)
                .ok_or_else(|| SgenError::UnresolvedReference {
                    reference: format!("{url}#{pointer}"),
                })?;
            trace!(%id, %url, pointer = %pointer, "loading schema node");
            let node = self.parse_node(value, &url, &pointer)?;
            *self.graph.node_mut(id) = node;
        }
        Ok(())
    }

    fn finish(self) -> SgenResult<SchemaGraph> {
        let graph = self.graph;
        for id in graph.ids() {
            let mut seen = HashSet::new();
            let mut current = id;
            while let Some(target) = graph.node(current).reference {
                if !seen.insert(current) {
                    let (url, pointer) = &self.locations[id.0];
                    return Err(SgenError::CircularReference(format!("{url}#{pointer}")));
                }
                current = target;
            }
        }
        Ok(graph)
    }

    /// Identity of the schema at a location, queueing it when first seen
    fn node_for(&mut self, url: &Url, pointer: String) -> SchemaId {
        let location = (url.clone(), pointer);
        if let Some(id) = self.index.get(&location) {
            return *id;
        }
        let id = self.graph.add(SchemaNode::default());
        self.index.insert(location.clone(), id);
        self.locations.push(location);
        self.queue.push_back(id);
        id
    }

    /// Resolve `$ref` text relative to `base` into a node identity
    fn resolve_ref(&mut self, base: &Url, reference: &str) -> SgenResult<SchemaId> {
        let target = base.join(reference).map_err(|e| SgenError::UnresolvedReference {
            reference: format!("{reference} ({e})"),
        })?;
        let pointer = urlencoding::decode(target.fragment().unwrap_or_default())
            .map_err(|e| SgenError::UnresolvedReference {
                reference: format!("{reference} ({e})"),
            })?
            .into_owned();
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(SgenError::UnresolvedReference {
                reference: reference.to_string(),
            });
        }
        let document_url = without_fragment(&target);
        let documents = self.documents;
        let document = documents
            .get(&document_url)
            .ok_or_else(|| SgenError::UnresolvedReference {
                reference: reference.to_string(),
            })?;
        if document.pointer(&pointer).is_none() {
            return Err(SgenError::UnresolvedReference {
                reference: reference.to_string(),
            });
        }
        let id = self.node_for(&document_url, pointer.clone());
        if document_url != *documents.root_url() {
            self.register_external(&document_url, &pointer, document, id);
        }
        Ok(id)
    }

    fn register_external(&mut self, url: &Url, pointer: &str, document: &Value, id: SchemaId) {
        let name = if pointer.is_empty() {
            document
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| file_stem(url))
        } else {
            let segments: Vec<&str> = pointer.split('/').collect();
            match segments.as_slice() {
                ["", container, name] if DEFINITION_CONTAINERS.contains(container) => {
                    Some(unescape_pointer_segment(name))
                }
                _ => None,
            }
        };
        if let Some(name) = name {
            let registered = self.graph.define(&name, id);
            debug!(%url, pointer, name = %registered, "merged external definition");
        }
    }

    fn parse_node(&mut self, value: &Value, url: &Url, pointer: &str) -> SgenResult<SchemaNode> {
        let map = match value {
            Value::Object(map) => map,
            Value::Bool(_) => return Ok(SchemaNode::default()),
            _ => return Err(SgenError::invalid(pointer, "schema must be an object or boolean")),
        };
        let mut node = SchemaNode::default();

        if let Some(reference) = map.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| SgenError::invalid(pointer, "$ref must be a string"))?;
            node.reference = Some(self.resolve_ref(url, reference)?);
        }

        node.types = parse_types(map, pointer)?;
        if map.get("nullable").and_then(Value::as_bool) == Some(true)
            && !node.has_type(JsonType::Null)
        {
            node.types.push(JsonType::Null);
        }
        node.format = string_keyword(map, "format", pointer)?;
        node.title = string_keyword(map, "title", pointer)?;
        node.description = string_keyword(map, "description", pointer)?;

        if let Some(properties) = map.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| SgenError::invalid(pointer, "properties must be an object"))?;
            for name in properties.keys() {
                let child = format!("{pointer}/properties/{}", escape_pointer_segment(name));
                let id = self.node_for(url, child);
                node.properties.insert(name.clone(), id);
            }
        }

        if let Some(required) = map.get("required") {
            match required {
                Value::Array(names) => {
                    node.required = names
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                }
                Value::Bool(_) => {}
                _ => return Err(SgenError::invalid(pointer, "required must be an array")),
            }
        }

        match map.get("items") {
            Some(Value::Array(items)) if !items.is_empty() => {
                node.items = Some(self.node_for(url, format!("{pointer}/items/0")));
            }
            Some(Value::Object(_)) | Some(Value::Bool(true)) => {
                node.items = Some(self.node_for(url, format!("{pointer}/items")));
            }
            _ => {}
        }

        match map.get("additionalProperties") {
            Some(Value::Bool(allowed)) => {
                node.additional_properties = AdditionalProperties::Allowed(*allowed);
            }
            Some(Value::Object(_)) => {
                let id = self.node_for(url, format!("{pointer}/additionalProperties"));
                node.additional_properties = AdditionalProperties::Schema(id);
            }
            _ => {}
        }

        node.all_of = self.parse_schema_list(map, "allOf", url, pointer)?;
        node.one_of = self.parse_schema_list(map, "oneOf", url, pointer)?;
        node.any_of = self.parse_schema_list(map, "anyOf", url, pointer)?;

        if let Some(values) = map.get("enum") {
            node.enumeration = values
                .as_array()
                .cloned()
                .ok_or_else(|| SgenError::invalid(pointer, "enum must be an array"))?;
        }
        for key in ["x-enumNames", "x-enum-varnames"] {
            if let Some(Value::Array(names)) = map.get(key) {
                node.enum_names = names
                    .iter()
                    .map(|n| n.as_str().unwrap_or_default().to_string())
                    .collect();
            }
        }
        node.constant = map.get("const").cloned();
        node.default = map.get("default").cloned();
        node.is_abstract = map.get("x-abstract").and_then(Value::as_bool) == Some(true);

        if let Some(discriminator) = map.get("discriminator") {
            node.discriminator = Some(self.parse_discriminator(discriminator, url, pointer)?);
        }

        for container in DEFINITION_CONTAINERS {
            if let Some(definitions) = map.get(container) {
                let definitions = definitions.as_object().ok_or_else(|| {
                    SgenError::invalid(pointer, format!("{container} must be an object"))
                })?;
                for name in definitions.keys() {
                    let child =
                        format!("{pointer}/{container}/{}", escape_pointer_segment(name));
                    let id = self.node_for(url, child);
                    self.graph.define(name, id);
                }
            }
        }

        node.extensions = map
            .iter()
            .filter(|(key, _)| {
                key.starts_with("x-")
                    && !matches!(
                        key.as_str(),
                        "x-enumNames" | "x-enum-varnames" | "x-abstract"
                    )
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<IndexMap<_, _>>();

        Ok(node)
    }

    fn parse_schema_list(
        &mut self,
        map: &Map<String, Value>,
        keyword: &str,
        url: &Url,
        pointer: &str,
    ) -> SgenResult<Vec<SchemaId>> {
        let Some(value) = map.get(keyword) else {
            return Ok(Vec::new());
        };
        let members = value
            .as_array()
            .ok_or_else(|| SgenError::invalid(pointer, format!("{keyword} must be an array")))?;
        Ok((0..members.len())
            .map(|i| self.node_for(url, format!("{pointer}/{keyword}/{i}")))
            .collect())
    }

    fn parse_discriminator(
        &mut self,
        value: &Value,
        url: &Url,
        pointer: &str,
    ) -> SgenResult<Discriminator> {
        match value {
            Value::String(property_name) => Ok(Discriminator::new(property_name.clone())),
            Value::Object(map) => {
                let property_name = map
                    .get("propertyName")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        SgenError::invalid(pointer, "discriminator requires a propertyName")
                    })?;
                let mut discriminator = Discriminator::new(property_name);
                if let Some(Value::Object(mapping)) = map.get("mapping") {
                    for (key, target) in mapping {
                        let Some(target) = target.as_str() else {
                            warn!(pointer, key, "ignoring non-string discriminator mapping");
                            continue;
                        };
                        let id = self.resolve_mapping_target(url, target)?;
                        discriminator.mapping.insert(key.clone(), id);
                    }
                }
                Ok(discriminator)
            }
            _ => Err(SgenError::invalid(
                pointer,
                "discriminator must be a string or an object",
            )),
        }
    }

    /// Mapping values are `$ref` strings or bare definition names
    fn resolve_mapping_target(&mut self, url: &Url, target: &str) -> SgenResult<SchemaId> {
        if target.contains('#') || target.contains('/') || target.contains('.') {
            return self.resolve_ref(url, target);
        }
        for container in DEFINITION_CONTAINERS {
            let reference = format!("#/{container}/{}", escape_pointer_segment(target));
            if let Ok(id) = self.resolve_ref(url, &reference) {
                return Ok(id);
            }
        }
        Err(SgenError::UnresolvedReference {
            reference: target.to_string(),
        })
    }
}

fn parse_types(map: &Map<String, Value>, pointer: &str) -> SgenResult<Vec<JsonType>> {
    let names: Vec<&str> = match map.get("type") {
        None => return Ok(Vec::new()),
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        Some(_) => return Err(SgenError::invalid(pointer, "type must be a string or array")),
    };
    names
        .into_iter()
        .map(|name| {
            JsonType::parse(name)
                .ok_or_else(|| SgenError::invalid(pointer, format!("unknown type '{name}'")))
        })
        .collect()
}

fn string_keyword(
    map: &Map<String, Value>,
    keyword: &str,
    pointer: &str,
) -> SgenResult<Option<String>> {
    match map.get(keyword) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(SgenError::invalid(pointer, format!("{keyword} must be a string"))),
    }
}

fn file_stem(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let stem = last.split('.').next().unwrap_or(last);
    if stem.is_empty() {
        return None;
    }
    Some(urlencoding::decode(stem).map_or_else(|_| stem.to_string(), |decoded| decoded.into_owned()))
}

fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
#[path = "load/load_tests.rs"]
mod load_tests;
