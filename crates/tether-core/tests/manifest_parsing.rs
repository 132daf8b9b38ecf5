use tempfile::TempDir;
use tether_core::manifest::Manifest;

#[test]
fn test_parse_manifest_from_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Tether.toml");
    std::fs::write(
        &path,
        r#"
[package]
name = "app"
version = "0.1.0"
description = "demo"
license = "MIT"

[dependencies]
foo = "^1.0.0"
"#,
    )
    .unwrap();

    let manifest = Manifest::from_path(&path).unwrap();
    assert_eq!(manifest.package.name, "app");
    assert_eq!(manifest.package.license.as_deref(), Some("MIT"));
    assert_eq!(manifest.dependencies.get("foo").map(String::as_str), Some("^1.0.0"));
}

#[test]
fn test_manifest_without_dependencies() {
    let manifest = Manifest::from_str(
        r#"
[package]
name = "leaf"
version = "1.0.0"
"#,
    )
    .unwrap();
    assert!(manifest.dependencies.is_empty());
}

#[test]
fn test_missing_manifest_reports_path() {
    let err = Manifest::from_path(std::path::Path::new("/nonexistent/Tether.toml")).unwrap_err();
    assert!(err.to_string().contains("Manifest error"), "got: {err}");
}

#[test]
fn test_missing_package_section_fails() {
    let err = Manifest::from_str("[dependencies]\nfoo = \"1.0.0\"\n").unwrap_err();
    assert!(err.to_string().contains("Failed to parse Tether.toml"));
}

#[test]
fn test_empty_package_name_rejected() {
    let err = Manifest::from_str("[package]\nname = \"\"\nversion = \"0.1.0\"\n").unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}
