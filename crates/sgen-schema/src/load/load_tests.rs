#![allow(non_snake_case)]

use super::*;
use serde_json::json;
use test_case::test_case;

fn url(text: &str) -> Url {
    Url::parse(text).unwrap()
}

// ============================================================================
// Document parsing
// ============================================================================

#[test_case("schema.yaml", DocumentFormat::Yaml)]
#[test_case("schema.YML", DocumentFormat::Yaml)]
#[test_case("schema.json", DocumentFormat::Json)]
#[test_case("https://example.com/schema", DocumentFormat::Detect)]
fn DocumentFormat___from_path___detects_extension(path: &str, expected: DocumentFormat) {
    assert_eq!(DocumentFormat::from_path(path), expected);
}

#[test]
fn parse_document___yaml_text___detected_as_yaml() {
    let text = "type: object\nproperties:\n  name:\n    type: string\n";

    let value = parse_document(text, DocumentFormat::Detect).unwrap();

    assert_eq!(value["properties"]["name"]["type"], "string");
}

#[test]
fn parse_document___garbage___returns_schema_load() {
    let result = parse_document("{ [", DocumentFormat::Detect);

    assert!(matches!(result, Err(SgenError::SchemaLoad(_))));
}

// ============================================================================
// Node loading
// ============================================================================

#[test]
fn from_value___properties___keep_declaration_order() {
    let graph = SchemaGraph::from_value(json!({
        "type": "object",
        "properties": {
            "zeta": { "type": "string" },
            "alpha": { "type": "integer" },
            "mid": { "type": "boolean" }
        }
    }))
    .unwrap();

    let names: Vec<&String> = graph.node(graph.root()).properties.keys().collect();

    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn from_value___same_reference_twice___shares_identity() {
    let graph = SchemaGraph::from_value(json!({
        "type": "object",
        "properties": {
            "a": { "$ref": "#/definitions/Thing" },
            "b": { "$ref": "#/definitions/Thing" }
        },
        "definitions": { "Thing": { "type": "object" } }
    }))
    .unwrap();
    let root = graph.node(graph.root());

    let a = graph.actual(root.properties["a"]);
    let b = graph.actual(root.properties["b"]);

    assert_eq!(a, b);
    assert_eq!(Some(a), graph.definition("Thing"));
}

#[test]
fn from_value___nested_defs___flattened_with_collision_suffix() {
    let graph = SchemaGraph::from_value(json!({
        "$defs": {
            "Outer": {
                "type": "object",
                "$defs": {
                    "Inner": { "type": "string" },
                    "Outer": { "type": "integer" }
                }
            }
        }
    }))
    .unwrap();

    let names: Vec<&String> = graph.definitions().keys().collect();

    assert_eq!(names, vec!["Outer", "Inner", "Outer2"]);
}

#[test]
fn from_value___discriminator_object_with_mapping___resolves_targets() {
    let graph = SchemaGraph::from_value(json!({
        "definitions": {
            "Animal": {
                "type": "object",
                "discriminator": {
                    "propertyName": "kind",
                    "mapping": { "dog": "#/definitions/Dog", "cat": "Cat" }
                }
            },
            "Dog": { "type": "object" },
            "Cat": { "type": "object" }
        }
    }))
    .unwrap();

    let discriminator = graph
        .node(graph.definition("Animal").unwrap())
        .discriminator
        .clone()
        .unwrap();

    assert_eq!(discriminator.property_name, "kind");
    assert_eq!(discriminator.mapping["dog"], graph.definition("Dog").unwrap());
    assert_eq!(discriminator.mapping["cat"], graph.definition("Cat").unwrap());
}

#[test]
fn from_value___discriminator_string___has_empty_mapping() {
    let graph = SchemaGraph::from_value(json!({ "type": "object", "discriminator": "kind" }))
        .unwrap();

    let discriminator = graph.node(graph.root()).discriminator.clone().unwrap();

    assert_eq!(discriminator, Discriminator::new("kind"));
}

#[test]
fn from_value___keywords___populate_node() {
    let graph = SchemaGraph::from_value(json!({
        "title": "Thing",
        "description": "A thing",
        "type": ["integer", "null"],
        "format": "int64",
        "enum": [1, 2],
        "x-enumNames": ["One", "Two"],
        "default": 1,
        "x-abstract": true,
        "x-custom": { "a": 1 }
    }))
    .unwrap();
    let node = graph.node(graph.root());

    assert_eq!(node.title.as_deref(), Some("Thing"));
    assert_eq!(node.description.as_deref(), Some("A thing"));
    assert_eq!(node.types, vec![JsonType::Integer, JsonType::Null]);
    assert_eq!(node.format.as_deref(), Some("int64"));
    assert_eq!(node.enumeration, vec![json!(1), json!(2)]);
    assert_eq!(node.enum_names, vec!["One", "Two"]);
    assert_eq!(node.default, Some(json!(1)));
    assert!(node.is_abstract);
    assert!(node.extensions.contains_key("x-custom"));
    assert!(!node.extensions.contains_key("x-abstract"));
}

#[test]
fn from_value___additional_properties_schema___loaded() {
    let graph = SchemaGraph::from_value(json!({
        "type": "object",
        "additionalProperties": { "type": "number" }
    }))
    .unwrap();

    let AdditionalProperties::Schema(values) = graph.node(graph.root()).additional_properties
    else {
        panic!("expected a schema");
    };

    assert_eq!(graph.node(values).types, vec![JsonType::Number]);
}

#[test]
fn from_value___tuple_items___uses_first_entry() {
    let graph = SchemaGraph::from_value(json!({
        "type": "array",
        "items": [{ "type": "string" }, { "type": "integer" }]
    }))
    .unwrap();

    let items = graph.node(graph.root()).items.unwrap();

    assert_eq!(graph.node(items).types, vec![JsonType::String]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn from_value___missing_local_reference___returns_unresolved() {
    let result = SchemaGraph::from_value(json!({
        "type": "object",
        "properties": { "a": { "$ref": "#/definitions/Missing" } }
    }));

    assert!(matches!(result, Err(SgenError::UnresolvedReference { .. })));
}

#[test]
fn from_value___missing_external_document___returns_unresolved() {
    let result = SchemaGraph::from_value(json!({ "$ref": "other.json#/definitions/X" }));

    assert!(matches!(result, Err(SgenError::UnresolvedReference { .. })));
}

#[test]
fn from_value___reference_cycle___returns_circular() {
    let result = SchemaGraph::from_value(json!({
        "definitions": {
            "A": { "$ref": "#/definitions/B" },
            "B": { "$ref": "#/definitions/A" }
        }
    }));

    assert!(matches!(result, Err(SgenError::CircularReference(_))));
}

#[test]
fn from_value___unknown_type___returns_invalid_schema() {
    let result = SchemaGraph::from_value(json!({ "type": "decimal128" }));

    assert!(matches!(result, Err(SgenError::InvalidSchema { .. })));
}

#[test]
fn from_value___non_object_properties___returns_invalid_schema() {
    let result = SchemaGraph::from_value(json!({ "properties": [1, 2] }));

    assert!(matches!(result, Err(SgenError::InvalidSchema { .. })));
}

// ============================================================================
// External documents
// ============================================================================

#[test]
fn DocumentSet___missing_documents___lists_unfetched_references() {
    let set = DocumentSet::new(
        url("file:///schemas/root.json"),
        json!({
            "properties": {
                "a": { "$ref": "common.json#/definitions/A" },
                "b": { "$ref": "common.json#/definitions/B" },
                "c": { "$ref": "https://example.com/c.json" },
                "d": { "$ref": "#/definitions/Local" }
            }
        }),
    );

    let missing = set.missing_documents();

    assert_eq!(
        missing,
        vec![
            url("file:///schemas/common.json"),
            url("https://example.com/c.json")
        ]
    );
}

#[test]
fn from_documents___external_fragment___merged_into_definitions() {
    let mut set = DocumentSet::new(
        url("file:///schemas/root.json"),
        json!({
            "type": "object",
            "properties": {
                "common": { "$ref": "common.json#/definitions/CommonType" },
                "whole": { "$ref": "whole.json" }
            }
        }),
    );
    set.insert(
        url("file:///schemas/common.json"),
        json!({ "definitions": { "CommonType": { "type": "object" } } }),
    );
    set.insert(
        url("file:///schemas/whole.json"),
        json!({ "type": "object", "properties": { "x": { "type": "string" } } }),
    );

    let graph = SchemaGraph::from_documents(&set).unwrap();

    assert!(set.missing_documents().is_empty());
    assert!(graph.definition("CommonType").is_some());
    assert!(graph.definition("whole").is_some());
}

#[test]
fn from_documents___external_name_collision___suffixes_external() {
    let mut set = DocumentSet::new(
        url("file:///root.json"),
        json!({
            "properties": { "t": { "$ref": "other.json#/definitions/Thing" } },
            "definitions": { "Thing": { "type": "string" } }
        }),
    );
    set.insert(
        url("file:///other.json"),
        json!({ "definitions": { "Thing": { "type": "integer" } } }),
    );

    let graph = SchemaGraph::from_documents(&set).unwrap();

    let local = graph.definition("Thing").unwrap();
    let external = graph.definition("Thing2").unwrap();
    assert_eq!(graph.node(local).types, vec![JsonType::String]);
    assert_eq!(graph.node(external).types, vec![JsonType::Integer]);
}

#[test]
fn from_value___percent_escaped_pointer___resolves_definition() {
    let graph = SchemaGraph::from_value(json!({
        "type": "object",
        "properties": { "a": { "$ref": "#/definitions/My%20Type" } },
        "definitions": { "My Type": { "type": "string" } }
    }))
    .unwrap();

    let property = graph.node(graph.root()).properties["a"];
    assert_eq!(graph.actual(property), graph.definition("My Type").unwrap());
}

#[test]
fn from_value___escape_decoding_to_invalid_utf8___returns_unresolved() {
    let result = SchemaGraph::from_value(json!({
        "type": "object",
        "properties": { "a": { "$ref": "#/definitions/Caf%C3%28" } },
        "definitions": { "Caf\u{e9}": { "type": "string" } }
    }));

    assert!(matches!(result, Err(SgenError::UnresolvedReference { .. })));
}
