//! Integration tests for the sgen binary.
//!
//! Runs the built executable against schemas in temporary directories and
//! checks output placement, flag handling, and exit codes.

#![allow(non_snake_case)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const CONTAINER_SCHEMA: &str = r#"{
    "title": "Container",
    "type": "object",
    "properties": {
        "base_type": { "type": "string" },
        "count": { "type": "integer", "default": 3 }
    },
    "required": ["base_type"]
}"#;

fn sgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sgen"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_schema(dir: &TempDir, name: &str, content: &str) -> String {
    fs::write(dir.path().join(name), content).unwrap();
    name.to_string()
}

// =============================================================================
// Output placement
// =============================================================================

#[test]
fn sgen___schema_file___default_output_in_working_directory() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", CONTAINER_SCHEMA);

    let output = sgen(dir.path(), &["--schema", &schema]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Writing schema classes to DataSchema.Generated.cs..."));
    let code = fs::read_to_string(dir.path().join("DataSchema.Generated.cs")).unwrap();
    assert!(code.contains("namespace DataSchema"));
    assert!(code.contains("public partial class Container"));
    assert!(code.contains("[YamlDotNet.Serialization.YamlMemberAttribute(Alias=\"base_type\")]"));
    assert!(!code.contains("Newtonsoft"));
}

#[test]
fn sgen___output_directory___namespace_file_inside() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", CONTAINER_SCHEMA);
    fs::create_dir(dir.path().join("out")).unwrap();

    let output = sgen(
        dir.path(),
        &["--schema", &schema, "--namespace", "Acme.Contracts", "--output", "out"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let code = fs::read_to_string(dir.path().join("out").join("Acme.Contracts.Generated.cs")).unwrap();
    assert!(code.contains("namespace Acme.Contracts"));
}

#[test]
fn sgen___output_file___written_verbatim() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", CONTAINER_SCHEMA);

    let output = sgen(
        dir.path(),
        &["--schema", &schema, "--output", "Models.cs", "--serializer", "json,yaml"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let code = fs::read_to_string(dir.path().join("Models.cs")).unwrap();
    assert!(code.contains("public static partial class JsonSerialization"));
    assert!(code.contains("public static partial class YamlSerialization"));
}

// =============================================================================
// Inputs and configuration
// =============================================================================

#[test]
fn sgen___stdin_yaml___generated() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_sgen"))
        .args(["--root", "Config"])
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"type: object\nproperties:\n  enabled:\n    type: boolean\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let code = fs::read_to_string(dir.path().join("DataSchema.Generated.cs")).unwrap();
    assert!(code.contains("public partial class Config"));
    assert!(code.contains("public bool Enabled"));
}

#[test]
fn sgen___config_file___settings_applied_and_flags_override() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", CONTAINER_SCHEMA);
    fs::write(
        dir.path().join("sgen.toml"),
        "output = \"generated\"\n\n[generator]\nnamespace = \"FromConfig\"\nserializers = [\"json\"]\n",
    )
    .unwrap();

    let output = sgen(dir.path(), &["--schema", &schema, "--namespace", "FromFlag"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let code = fs::read_to_string(dir.path().join("generated")).unwrap();
    assert!(code.contains("namespace FromFlag"));
    assert!(code.contains("Newtonsoft.Json.JsonPropertyAttribute"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn sgen___untitled_schema_without_root___fails_with_message() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", r#"{ "type": "object" }"#);

    let output = sgen(dir.path(), &["--schema", &schema]);

    assert_eq!(output.status.code(), Some(6));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no root name is specified and schema has no title that can be used as type name"));
    assert!(!dir.path().join("DataSchema.Generated.cs").exists());
}

#[test]
fn sgen___missing_schema_file___schema_load_exit_code() {
    let dir = TempDir::new().unwrap();

    let output = sgen(dir.path(), &["--schema", "absent.json"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn sgen___invalid_namespace___config_exit_code() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", CONTAINER_SCHEMA);

    let output = sgen(dir.path(), &["--schema", &schema, "--namespace", "9lives"]);

    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn sgen___workflow_operators_flag___operators_emitted() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "schema.json", CONTAINER_SCHEMA);

    let output = sgen(dir.path(), &["--schema", &schema, "--workflow-operators"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let code = fs::read_to_string(dir.path().join("DataSchema.Generated.cs")).unwrap();
    assert!(code.contains("public System.IObservable<Container> Generate()"));
    assert!(code.contains("public partial class SerializeToYaml"));
    assert!(code.contains("public partial class DeserializeFromYaml"));
}
