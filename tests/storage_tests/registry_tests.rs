//! Tests for TableRegistry and TableDef parsing

use std::str::FromStr;

use tablekv::record::{Record, RecordCodec};
use tablekv::storage::{TableDef, TableRegistry};
use tablekv::StoreError;
use tempfile::TempDir;

fn defs(names: &[&str]) -> Vec<TableDef> {
    names.iter().map(|name| TableDef::new(*name)).collect()
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_open_registers_every_table() {
    let temp_dir = TempDir::new().unwrap();

    let registry =
        TableRegistry::open(temp_dir.path(), &defs(&["users", "events"]), RecordCodec::default())
            .unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names(), vec!["events".to_string(), "users".to_string()]);
    assert!(registry.contains("users"));
    assert!(temp_dir.path().join("users").is_dir());
    assert!(temp_dir.path().join("events").is_dir());
}

#[test]
fn test_open_without_tables() {
    let temp_dir = TempDir::new().unwrap();

    let registry = TableRegistry::open(temp_dir.path(), &[], RecordCodec::default()).unwrap();

    assert!(registry.is_empty());
    assert!(registry.names().is_empty());
}

#[test]
fn test_resolve_known_table() {
    let temp_dir = TempDir::new().unwrap();
    let registry =
        TableRegistry::open(temp_dir.path(), &defs(&["users"]), RecordCodec::default()).unwrap();

    let table = registry.resolve("users").unwrap();

    assert_eq!(table.name(), "users");
}

#[test]
fn test_resolve_unknown_table() {
    let temp_dir = TempDir::new().unwrap();
    let registry =
        TableRegistry::open(temp_dir.path(), &defs(&["users"]), RecordCodec::default()).unwrap();

    let err = registry.resolve("../users").unwrap_err();

    match err {
        StoreError::UnknownTable(name) => assert_eq!(name, "../users"),
        other => panic!("Expected UnknownTable, got {:?}", other),
    }
}

#[test]
fn test_duplicate_names_rejected_before_opening() {
    let temp_dir = TempDir::new().unwrap();

    let result = TableRegistry::open(
        temp_dir.path(),
        &defs(&["users", "logs", "users"]),
        RecordCodec::default(),
    );

    assert!(matches!(result, Err(StoreError::Config(_))));
    assert!(!temp_dir.path().join("users").exists());
    assert!(!temp_dir.path().join("logs").exists());
}

#[test]
fn test_invalid_name_rejected_before_opening() {
    let temp_dir = TempDir::new().unwrap();

    let result = TableRegistry::open(
        temp_dir.path(),
        &defs(&["users", "a/b"]),
        RecordCodec::default(),
    );

    assert!(matches!(result, Err(StoreError::Config(_))));
    assert!(!temp_dir.path().join("users").exists());
}

#[test]
fn test_tables_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let registry =
        TableRegistry::open(temp_dir.path(), &defs(&["a", "b"]), RecordCodec::default()).unwrap();

    registry
        .resolve("a")
        .unwrap()
        .put(Some("shared".into()), Record::new().with("in", "a"))
        .unwrap();

    assert_eq!(registry.resolve("b").unwrap().get("shared").unwrap(), None);
    assert!(registry.resolve("a").unwrap().get("shared").unwrap().is_some());
}

#[test]
fn test_engine_failure_surfaces_unmodified() {
    let temp_dir = TempDir::new().unwrap();
    let _held = TableRegistry::open(temp_dir.path(), &defs(&["users"]), RecordCodec::default())
        .unwrap();

    let result = TableRegistry::open(temp_dir.path(), &defs(&["users"]), RecordCodec::default());

    assert!(matches!(result, Err(StoreError::StorageEngine(_))));
}

// =============================================================================
// TableDef Parsing Tests
// =============================================================================

#[test]
fn test_parse_plain_name() {
    let def = TableDef::from_str("users").unwrap();

    assert_eq!(def, TableDef::new("users"));
    assert_eq!(def.options.prefix_length, None);
}

#[test]
fn test_parse_name_with_prefix_length() {
    let def: TableDef = "events:8".parse().unwrap();

    assert_eq!(def.name, "events");
    assert_eq!(def.options.prefix_length, Some(8));
}

#[test]
fn test_parse_rejects_bad_definitions() {
    for raw in ["", "events:", "events:abc", "events:0", "a/b", "..:4"] {
        let result = TableDef::from_str(raw);
        assert!(matches!(result, Err(StoreError::Config(_))), "input {:?}", raw);
    }
}
