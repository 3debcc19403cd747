#![allow(non_snake_case)]

use super::*;
use serde_json::{Value, json};
use test_case::test_case;

fn load(document: Value) -> SchemaGraph {
    SchemaGraph::from_value(document).unwrap()
}

fn property(graph: &SchemaGraph, name: &str) -> SchemaId {
    graph.node(graph.root()).properties[name]
}

fn primitive(primitive: Primitive) -> TypeRef {
    TypeRef::Primitive(primitive)
}

fn nullable(ty: TypeRef) -> TypeRef {
    TypeRef::Nullable(Box::new(ty))
}

// ============================================================================
// Primitive table
// ============================================================================

#[test_case(JsonType::Boolean, None, Primitive::Boolean)]
#[test_case(JsonType::Integer, None, Primitive::Int)]
#[test_case(JsonType::Integer, Some("int64"), Primitive::Long)]
#[test_case(JsonType::Integer, Some("int16"), Primitive::Short)]
#[test_case(JsonType::Integer, Some("byte"), Primitive::Byte)]
#[test_case(JsonType::Integer, Some("uint32"), Primitive::UInt)]
#[test_case(JsonType::Integer, Some("uint64"), Primitive::ULong)]
#[test_case(JsonType::Number, None, Primitive::Double)]
#[test_case(JsonType::Number, Some("float"), Primitive::Float)]
#[test_case(JsonType::Number, Some("decimal"), Primitive::Decimal)]
#[test_case(JsonType::String, None, Primitive::String)]
#[test_case(JsonType::String, Some("date-time"), Primitive::DateTimeOffset)]
#[test_case(JsonType::String, Some("duration"), Primitive::TimeSpan)]
#[test_case(JsonType::String, Some("uuid"), Primitive::Guid)]
#[test_case(JsonType::Object, None, Primitive::Object)]
fn Primitive___from_json_type___follows_table(
    ty: JsonType,
    format: Option<&str>,
    expected: Primitive,
) {
    assert_eq!(Primitive::from_json_type(ty, format), expected);
}

#[test]
fn Primitive___integral___excludes_floating_point() {
    assert!(Primitive::Long.is_integral());
    assert!(!Primitive::Double.is_integral());
    assert!(Primitive::Double.is_numeric());
    assert!(!Primitive::String.is_numeric());
}

// ============================================================================
// Scalars, arrays and maps
// ============================================================================

#[test]
fn TypeResolver___scalar_properties___resolve_to_primitives() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "count": { "type": ["null", "integer"] },
            "ratio": { "type": "number", "nullable": true },
            "anything": {}
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    assert_eq!(
        resolver.resolve(property(&graph, "name"), None),
        primitive(Primitive::String)
    );
    assert_eq!(
        resolver.resolve(property(&graph, "count"), None),
        nullable(primitive(Primitive::Int))
    );
    assert_eq!(
        resolver.resolve(property(&graph, "ratio"), None),
        nullable(primitive(Primitive::Double))
    );
    assert_eq!(resolver.resolve(property(&graph, "anything"), None), TypeRef::ANY);
}

#[test]
fn TypeResolver___array_property___resolves_element_type() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "tags": { "type": "array", "items": { "type": "string" } },
            "untyped": { "type": "array" }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    assert_eq!(
        resolver.resolve(property(&graph, "tags"), None),
        TypeRef::Array(Box::new(primitive(Primitive::String)))
    );
    assert_eq!(
        resolver.resolve(property(&graph, "untyped"), None),
        TypeRef::Array(Box::new(TypeRef::ANY))
    );
}

#[test]
fn TypeResolver___additional_properties_only___resolves_to_dictionary() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "lookup": {
                "type": "object",
                "additionalProperties": { "type": "integer" }
            }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    assert_eq!(
        resolver.resolve(property(&graph, "lookup"), None),
        TypeRef::Dictionary(
            Box::new(primitive(Primitive::String)),
            Box::new(primitive(Primitive::Int))
        )
    );
    assert!(resolver.nominals().is_empty());
}

// ============================================================================
// Nominal types
// ============================================================================

#[test]
fn TypeResolver___shared_definition___named_once() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "first": { "$ref": "#/definitions/Point" },
            "second": { "$ref": "#/definitions/Point" }
        },
        "definitions": {
            "Point": {
                "type": "object",
                "properties": { "x": { "type": "number" } }
            }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    let first = resolver.resolve(property(&graph, "first"), Some("First"));
    let second = resolver.resolve(property(&graph, "second"), Some("Second"));

    assert_eq!(first, second);
    assert_eq!(first.nominal().map(|n| n.name.as_str()), Some("Point"));
    assert_eq!(resolver.nominals().len(), 1);
}

#[test]
fn TypeResolver___inline_object___named_after_hint() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "settings": {
                "type": "object",
                "properties": { "enabled": { "type": "boolean" } }
            }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    let ty = resolver.resolve(property(&graph, "settings"), Some("settings"));

    let nominal = ty.nominal().unwrap();
    assert_eq!(nominal.name, "Settings");
    assert_eq!(nominal.kind, NominalKind::Class);
}

#[test]
fn TypeResolver___enumeration___registers_enum() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "color": { "type": "string", "enum": ["red", "green"] }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    let ty = resolver.resolve(property(&graph, "color"), Some("ShapeColor"));

    let nominal = ty.nominal().unwrap();
    assert_eq!(nominal.name, "ShapeColor");
    assert_eq!(nominal.kind, NominalKind::Enum);
    assert!(ty.is_value_type());
}

#[test]
fn TypeResolver___external_type_name___used_verbatim_and_not_registered() {
    let graph = load(json!({
        "type": "object",
        "properties": {
            "shared": {
                "type": "object",
                "x-sgen-typeName": "Acme.Contracts.CommonType",
                "properties": { "bar": { "type": "integer" } }
            }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    let ty = resolver.resolve(property(&graph, "shared"), Some("Shared"));

    let nominal = ty.nominal().unwrap();
    assert_eq!(nominal.name, "Acme.Contracts.CommonType");
    assert!(nominal.is_external());
    assert!(resolver.nominals().is_empty());
}

#[test]
fn TypeResolver___self_referencing_definition___terminates() {
    let graph = load(json!({
        "definitions": {
            "Node": {
                "type": "object",
                "properties": {
                    "next": { "$ref": "#/definitions/Node" },
                    "children": { "type": "array", "items": { "$ref": "#/definitions/Node" } }
                }
            }
        }
    }));
    let node = graph.definition("Node").unwrap();
    let next = graph.node(node).properties["next"];
    let mut resolver = TypeResolver::new(&graph);

    let own = resolver.resolve(node, Some("Node"));
    let through_property = resolver.resolve(next, Some("Next"));

    assert_eq!(own, through_property);
    assert_eq!(resolver.nominals().len(), 1);
}

// ============================================================================
// Unions and common bases
// ============================================================================

fn hierarchy(union: Value) -> Value {
    json!({
        "type": "object",
        "properties": { "pet": union },
        "definitions": {
            "Animal": {
                "type": "object",
                "properties": { "name": { "type": "string" } }
            },
            "Dog": {
                "type": "object",
                "allOf": [{ "$ref": "#/definitions/Animal" }],
                "properties": { "bark": { "type": "boolean" } }
            },
            "Cat": {
                "type": "object",
                "allOf": [{ "$ref": "#/definitions/Animal" }],
                "properties": { "lives": { "type": "integer" } }
            },
            "Rock": {
                "type": "object",
                "properties": { "mass": { "type": "number" } }
            },
            "Boulder": {
                "type": "object",
                "allOf": [{ "$ref": "#/definitions/Rock" }],
                "properties": { "volume": { "type": "number" } }
            }
        }
    })
}

#[test]
fn TypeResolver___union_of_siblings___resolves_to_common_base() {
    let graph = load(hierarchy(json!({
        "oneOf": [
            { "$ref": "#/definitions/Dog" },
            { "$ref": "#/definitions/Cat" }
        ]
    })));
    let mut resolver = TypeResolver::new(&graph);

    let ty = resolver.resolve(property(&graph, "pet"), Some("Pet"));

    assert_eq!(ty.nominal().map(|n| n.name.as_str()), Some("Animal"));
    assert!(!ty.is_nullable());
}

#[test]
fn TypeResolver___union_with_null___resolves_to_nullable_branch() {
    let graph = load(hierarchy(json!({
        "oneOf": [
            { "$ref": "#/definitions/Dog" },
            { "type": "null" }
        ]
    })));
    let mut resolver = TypeResolver::new(&graph);

    let ty = resolver.resolve(property(&graph, "pet"), Some("Pet"));

    assert!(ty.is_nullable());
    assert_eq!(ty.nominal().map(|n| n.name.as_str()), Some("Dog"));
}

#[test]
fn TypeResolver___union_of_unrelated_types___falls_back_to_any() {
    let graph = load(hierarchy(json!({
        "oneOf": [
            { "$ref": "#/definitions/Dog" },
            { "$ref": "#/definitions/Rock" }
        ]
    })));
    let mut resolver = TypeResolver::new(&graph);

    assert_eq!(resolver.resolve(property(&graph, "pet"), Some("Pet")), TypeRef::ANY);
}

#[test]
fn TypeResolver___union_of_unrelated_hierarchies___falls_back_to_any() {
    let graph = load(hierarchy(json!({
        "oneOf": [
            { "$ref": "#/definitions/Dog" },
            { "$ref": "#/definitions/Boulder" },
            { "type": "null" }
        ]
    })));
    let mut resolver = TypeResolver::new(&graph);

    assert_eq!(resolver.resolve(property(&graph, "pet"), Some("Pet")), TypeRef::ANY);
}

#[test]
fn TypeResolver___union_with_base_member___resolves_to_base() {
    let graph = load(hierarchy(json!({
        "anyOf": [
            { "$ref": "#/definitions/Dog" },
            { "$ref": "#/definitions/Animal" }
        ]
    })));
    let mut resolver = TypeResolver::new(&graph);

    let ty = resolver.resolve(property(&graph, "pet"), Some("Pet"));

    assert_eq!(ty.nominal().map(|n| n.name.as_str()), Some("Animal"));
}

#[test]
fn TypeResolver___assignability___follows_inheritance() {
    let graph = load(hierarchy(json!({ "type": "string" })));
    let animal = graph.definition("Animal").unwrap();
    let dog = graph.definition("Dog").unwrap();
    let rock = graph.definition("Rock").unwrap();
    let resolver = TypeResolver::new(&graph);

    assert!(resolver.is_assignable_from(animal, dog));
    assert!(resolver.is_assignable_from(dog, dog));
    assert!(!resolver.is_assignable_from(dog, animal));
    assert!(!resolver.is_assignable_from(animal, rock));
}

#[test]
fn TypeResolver___empty_base_definition___still_a_class() {
    let graph = load(json!({
        "definitions": {
            "BaseType": { "type": "object" },
            "EmptyDerivedType": {
                "type": "object",
                "allOf": [{ "$ref": "#/definitions/BaseType" }]
            }
        }
    }));
    let mut resolver = TypeResolver::new(&graph);

    let base = resolver.resolve(graph.definition("BaseType").unwrap(), None);
    let derived = resolver.resolve_class(graph.definition("EmptyDerivedType").unwrap(), None);

    assert_eq!(base.nominal().map(|n| n.kind), Some(NominalKind::Class));
    assert_eq!(derived.map(|n| n.name), Some("EmptyDerivedType".to_string()));
}
