//! Property-based tests for discriminator normalization
//!
//! Random discriminated hierarchies anchored at a definition, a property, or
//! an array item must normalize to a fixed point in one pass, with no derived
//! schema keeping the discriminator property.

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use sgen_schema::{SchemaGraph, normalize};

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Definition,
    Property,
    Items,
}

fn arb_anchor() -> impl Strategy<Value = Anchor> {
    prop_oneof![
        Just(Anchor::Definition),
        Just(Anchor::Property),
        Just(Anchor::Items),
    ]
}

// Strategy: per derived type, whether it declares the discriminator as a
// one-value enum
fn arb_derived() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..6)
}

fn build_schema(anchor: Anchor, derived: &[bool], with_null: bool) -> Value {
    let mut definitions = Map::new();
    let mut union = Vec::new();
    for (i, declares_kind) in derived.iter().enumerate() {
        let name = format!("Derived{i}");
        let mut properties = Map::new();
        properties.insert(format!("field{i}"), json!({ "type": "string" }));
        if *declares_kind {
            properties.insert("kind".into(), json!({ "type": "string", "enum": [name.clone()] }));
        }
        definitions.insert(
            name.clone(),
            json!({ "type": "object", "properties": properties }),
        );
        union.push(json!({ "$ref": format!("#/definitions/{name}") }));
    }
    if with_null {
        union.push(json!({ "type": "null" }));
    }
    let anchor_schema = json!({ "discriminator": "kind", "oneOf": union });

    let root_property = match anchor {
        Anchor::Definition => {
            definitions.insert("Base".into(), anchor_schema);
            json!({ "$ref": "#/definitions/Base" })
        }
        Anchor::Property => anchor_schema,
        Anchor::Items => json!({ "type": "array", "items": anchor_schema }),
    };
    json!({
        "type": "object",
        "properties": { "member": root_property },
        "definitions": definitions
    })
}

proptest! {
    /// Property: a normalized graph is a fixed point of normalization
    #[test]
    fn proptest_normalize_is_idempotent(
        anchor in arb_anchor(),
        derived in arb_derived(),
        with_null in any::<bool>(),
    ) {
        let schema = build_schema(anchor, &derived, with_null);
        let mut graph = SchemaGraph::from_value(schema).expect("generated schema should load");

        normalize(&mut graph);
        let definitions: Vec<String> = graph.definitions().keys().cloned().collect();
        let second = normalize(&mut graph);

        prop_assert!(second.is_noop(), "second pass rewrote: {:?}", second);
        prop_assert_eq!(graph.definitions().keys().cloned().collect::<Vec<_>>(), definitions);
    }

    /// Property: every derived schema links to exactly one base and loses `kind`
    #[test]
    fn proptest_normalize_links_every_derived(
        anchor in arb_anchor(),
        derived in arb_derived(),
    ) {
        let schema = build_schema(anchor, &derived, false);
        let mut graph = SchemaGraph::from_value(schema).expect("generated schema should load");

        normalize(&mut graph);

        let base = match anchor {
            Anchor::Definition => graph.definition("Base"),
            Anchor::Property => graph.definition("member"),
            Anchor::Items => graph.definition("Anonymous"),
        }
        .expect("anchor should be materialized");
        for i in 0..derived.len() {
            let id = graph.definition(&format!("Derived{i}")).expect("derived definition");
            prop_assert_eq!(graph.inherited(id), Some(base));
            prop_assert_eq!(graph.node(id).all_of.len(), 1);
            prop_assert!(!graph.node(id).properties.contains_key("kind"));
        }
    }
}
