use std::fs;

use tempfile::tempdir;

use crate::config::{ConfigFormat, Configuration};

#[test]
fn test_get_returns_empty_string_when_absent() {
    let config = Configuration::new();
    assert_eq!(config.get("MISSING"), "");
}

#[test]
fn test_get_or_treats_empty_as_absent() {
    let config = Configuration::new().with("PORT", "").with("HOST", "example.org");
    assert_eq!(config.get_or("PORT", "8080"), "8080");
    assert_eq!(config.get_or("HOST", "localhost"), "example.org");
    assert_eq!(config.get_or("OTHER", "x"), "x");
}

#[test]
fn test_get_i64_or() {
    let config = Configuration::new()
        .with("THRESHOLD", "250")
        .with("BROKEN", "fast")
        .with("PADDED", " 12 ");
    assert_eq!(config.get_i64_or("THRESHOLD", 400), 250);
    assert_eq!(config.get_i64_or("BROKEN", 400), 400);
    assert_eq!(config.get_i64_or("PADDED", 0), 12);
    assert_eq!(config.get_i64_or("MISSING", 7), 7);
}

#[test]
fn test_get_bool() {
    let config = Configuration::new()
        .with("A", "true")
        .with("B", "1")
        .with("C", "YES")
        .with("D", "false")
        .with("E", "");
    assert!(config.get_bool("A"));
    assert!(config.get_bool("B"));
    assert!(config.get_bool("C"));
    assert!(!config.get_bool("D"));
    assert!(!config.get_bool("E"));
    assert!(!config.get_bool("MISSING"));
}

#[test]
fn test_merge_overrides() {
    let mut base = Configuration::new().with("PORT", "8080").with("DB_ENGINE", "sqlite");
    base.merge(Configuration::new().with("PORT", "9000"));
    assert_eq!(base.get("PORT"), "9000");
    assert_eq!(base.get("DB_ENGINE"), "sqlite");
}

#[test]
fn test_from_file_json_stringifies_scalars() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keel.json");
    fs::write(
        &path,
        r#"{"PORT": 9090, "TEMPLATE_DISABLE": true, "DB_URI": "sqlite::memory:", "UNSET": null}"#,
    )
    .unwrap();

    let config = Configuration::from_file(&path).unwrap();
    assert_eq!(config.get("PORT"), "9090");
    assert!(config.get_bool("TEMPLATE_DISABLE"));
    assert_eq!(config.get("DB_URI"), "sqlite::memory:");
    assert!(!config.contains_key("UNSET"));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_from_file_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keel.toml");
    fs::write(&path, "PORT = 7070\nDB_ENGINE = \"mysql\"\n").unwrap();

    let config = Configuration::from_file(&path).unwrap();
    assert_eq!(config.get_i64_or("PORT", 0), 7070);
    assert_eq!(config.get("DB_ENGINE"), "mysql");
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_from_file_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keel.yml");
    fs::write(&path, "LOG_QUERY: \"1\"\nDB_SLOW_THRESHOLD: 100\n").unwrap();

    let config = Configuration::from_file(&path).unwrap();
    assert_eq!(config.get("LOG_QUERY"), "1");
    assert_eq!(config.get_i64_or("DB_SLOW_THRESHOLD", 400), 100);
}

#[test]
fn test_from_file_rejects_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keel.ini");
    fs::write(&path, "PORT=1").unwrap();
    assert!(Configuration::from_file(&path).is_err());
    assert_eq!(ConfigFormat::from_path(&path), None);
}
