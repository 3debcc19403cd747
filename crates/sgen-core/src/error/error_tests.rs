#![allow(non_snake_case)]

use super::*;

#[test]
fn SgenError___missing_root_type_name___returns_code_6() {
    let err = SgenError::MissingRootTypeName;

    let code = err.exit_code();

    assert_eq!(code, 6);
}

#[test]
fn SgenError___unresolved_reference___displays_correctly() {
    let err = SgenError::UnresolvedReference {
        reference: "#/definitions/Missing".into(),
    };

    let display = err.to_string();

    assert_eq!(display, "unresolved reference: #/definitions/Missing");
}

#[test]
fn SgenError___invalid_helper___builds_invalid_schema() {
    let err = SgenError::invalid("/properties/foo", "expected an object");

    assert_eq!(
        err.to_string(),
        "invalid schema at /properties/foo: expected an object"
    );
}

#[test]
fn SgenError___from_serde_json___maps_to_schema_load() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();

    let err: SgenError = json_err.into();

    assert!(matches!(err, SgenError::SchemaLoad(_)));
}

#[test]
fn SgenError___from_serde_yaml___maps_to_schema_load() {
    let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("key: [unclosed").unwrap_err();

    let err: SgenError = yaml_err.into();

    assert!(matches!(err, SgenError::SchemaLoad(_)));
}

#[test]
fn SgenError___from_io___maps_to_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "schema.json");

    let err: SgenError = io_err.into();

    assert!(matches!(err, SgenError::Io(_)));
    assert_eq!(err.exit_code(), 8);
}

#[test]
fn SgenError___all_variants___have_unique_nonzero_codes() {
    let errors = vec![
        SgenError::SchemaLoad("x".into()),
        SgenError::UnresolvedReference {
            reference: "x".into(),
        },
        SgenError::CircularReference("x".into()),
        SgenError::invalid("", "x"),
        SgenError::MissingRootTypeName,
        SgenError::Config("x".into()),
        SgenError::Io(std::io::Error::other("x")),
    ];

    let mut codes: Vec<i32> = errors.iter().map(SgenError::exit_code).collect();
    codes.sort_unstable();
    codes.dedup();

    assert_eq!(codes.len(), errors.len());
    assert!(codes.iter().all(|c| *c != 0));
}
