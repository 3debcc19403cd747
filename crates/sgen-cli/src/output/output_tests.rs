#![allow(non_snake_case)]

use super::*;
use tempfile::TempDir;

#[test]
fn output_path___none___default_file_in_working_directory() {
    assert_eq!(
        output_path(None, "Acme.Contracts"),
        PathBuf::from("Acme.Contracts.Generated.cs")
    );
}

#[test]
fn output_path___existing_directory___default_file_inside() {
    let dir = TempDir::new().unwrap();

    let path = output_path(Some(dir.path()), "DataSchema");

    assert_eq!(path, dir.path().join("DataSchema.Generated.cs"));
}

#[test]
fn output_path___file_path___used_verbatim() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Models.cs");

    assert_eq!(output_path(Some(&file), "DataSchema"), file);
}

#[tokio::test]
async fn write___missing_parent___created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("out").join("Models.cs");

    write(&path, "namespace DataSchema\n{\n}\n").await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "namespace DataSchema\n{\n}\n"
    );
}

#[tokio::test]
async fn write___existing_file___overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Models.cs");
    std::fs::write(&path, "old").unwrap();

    write(&path, "new").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
}
