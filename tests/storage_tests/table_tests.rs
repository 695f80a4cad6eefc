//! Tests for Table
//!
//! These tests verify:
//! - Key resolution (explicit key, `_id`, generated)
//! - get/put/delete semantics, including absent keys
//! - Batch atomicity for put_many/delete_many
//! - Multi-key lookup with partial presence
//! - Full and prefix scans in engine key order
//! - Persistence across reopen

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use tablekv::record::{Record, RecordCodec, Value, ID_FIELD};
use tablekv::storage::{Table, TableDef};
use tablekv::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_table() -> (TempDir, Table) {
    let temp_dir = TempDir::new().unwrap();
    let table = Table::open(temp_dir.path(), &TableDef::new("t"), RecordCodec::default()).unwrap();
    (temp_dir, table)
}

fn setup_temp_table_with_codec(codec: RecordCodec) -> (TempDir, Table) {
    let temp_dir = TempDir::new().unwrap();
    let table = Table::open(temp_dir.path(), &TableDef::new("t"), codec).unwrap();
    (temp_dir, table)
}

fn named(name: &str) -> Record {
    Record::new().with("name", name)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_table_directory() {
    let temp_dir = TempDir::new().unwrap();

    let table = Table::open(temp_dir.path(), &TableDef::new("users"), RecordCodec::default()).unwrap();

    assert_eq!(table.name(), "users");
    assert_eq!(table.path(), temp_dir.path().join("users"));
    assert!(temp_dir.path().join("users").is_dir());
    assert_eq!(table.to_string(), "<Table: users>");
}

#[test]
fn test_open_rejects_invalid_name() {
    let temp_dir = TempDir::new().unwrap();

    for name in ["", ".", "..", "a/b"] {
        let result = Table::open(temp_dir.path(), &TableDef::new(name), RecordCodec::default());
        assert!(matches!(result, Err(StoreError::Config(_))), "name {:?}", name);
    }
}

#[test]
fn test_open_with_prefix_length() {
    let temp_dir = TempDir::new().unwrap();
    let def = TableDef::new("events").with_prefix_length(4);

    let table = Table::open(temp_dir.path(), &def, RecordCodec::default()).unwrap();
    table.put(Some("abcd-1".into()), named("x")).unwrap();

    assert!(table.get("abcd-1").unwrap().is_some());
}

// =============================================================================
// Key Resolution Tests
// =============================================================================

#[test]
fn test_put_uses_record_id() {
    let (_temp, table) = setup_temp_table();

    let key = table.put(None, named("x").with(ID_FIELD, "k1")).unwrap();

    assert_eq!(key, "k1");
    assert_eq!(table.get("k1").unwrap().unwrap().id(), Some("k1"));
}

#[test]
fn test_put_generates_fresh_keys() {
    let (_temp, table) = setup_temp_table();

    let mut seen = HashSet::new();
    for _ in 0..100 {
        let key = table.put(None, Record::new()).unwrap();
        assert!(!key.is_empty());
        assert!(seen.insert(key));
    }

    assert_eq!(table.scan_keys().unwrap().len(), 100);
}

#[test]
fn test_put_explicit_key_wins_over_id() {
    let (_temp, table) = setup_temp_table();

    let key = table
        .put(Some("explicit".into()), Record::new().with(ID_FIELD, "other"))
        .unwrap();

    assert_eq!(key, "explicit");
    let stored = table.get("explicit").unwrap().unwrap();
    assert_eq!(stored.get(ID_FIELD), Some(&Value::from("explicit")));
    assert_eq!(table.get("other").unwrap(), None);
}

#[test]
fn test_put_empty_key_treated_as_absent() {
    let (_temp, table) = setup_temp_table();

    let key = table
        .put(Some(String::new()), Record::new().with(ID_FIELD, "from-id"))
        .unwrap();

    assert_eq!(key, "from-id");
}

#[test]
fn test_put_non_string_id_is_replaced() {
    let (_temp, table) = setup_temp_table();

    let key = table.put(None, Record::new().with(ID_FIELD, 17)).unwrap();

    assert_ne!(key, "17");
    let stored = table.get(&key).unwrap().unwrap();
    assert_eq!(stored.id(), Some(key.as_str()));
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_get_absent_key() {
    let (_temp, table) = setup_temp_table();

    assert_eq!(table.get("never-written").unwrap(), None);
}

#[test]
fn test_put_overwrite_last_writer_wins() {
    let (_temp, table) = setup_temp_table();

    table.put(Some("k".into()), named("first")).unwrap();
    table.put(Some("k".into()), named("second")).unwrap();

    let stored = table.get("k").unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&Value::from("second")));
}

#[test]
fn test_delete() {
    let (_temp, table) = setup_temp_table();

    table.put(Some("k".into()), named("x")).unwrap();
    table.delete("k").unwrap();

    assert_eq!(table.get("k").unwrap(), None);
}

#[test]
fn test_delete_absent_key_is_noop() {
    let (_temp, table) = setup_temp_table();
    table.put(Some("keep".into()), named("x")).unwrap();

    table.delete("missing").unwrap();

    assert_eq!(table.scan_keys().unwrap(), vec!["keep".to_string()]);
}

#[test]
fn test_put_rejects_oversized_record() {
    let (_temp, table) = setup_temp_table_with_codec(RecordCodec::new(64));

    let result = table.put(Some("big".into()), Record::new().with("blob", "x".repeat(256)));

    assert!(matches!(result, Err(StoreError::Serialization(_))));
    assert_eq!(table.get("big").unwrap(), None);
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_put_many() {
    let (_temp, table) = setup_temp_table();

    let keys = table
        .put_many(vec![
            (Some("a".into()), named("A")),
            (None, named("B").with(ID_FIELD, "b")),
            (None, named("C")),
        ])
        .unwrap();

    assert_eq!(keys.len(), 3);
    assert_eq!(&keys[..2], &["a".to_string(), "b".to_string()]);
    for key in &keys {
        assert_eq!(table.get(key).unwrap().unwrap().id(), Some(key.as_str()));
    }
}

#[test]
fn test_put_many_later_duplicate_wins() {
    let (_temp, table) = setup_temp_table();

    table
        .put_many(vec![
            (Some("dup".into()), named("first")),
            (Some("dup".into()), named("second")),
        ])
        .unwrap();

    let stored = table.get("dup").unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&Value::from("second")));
    assert_eq!(table.scan_keys().unwrap().len(), 1);
}

#[test]
fn test_put_many_is_atomic_on_encode_failure() {
    let (_temp, table) = setup_temp_table_with_codec(RecordCodec::new(64));

    let result = table.put_many(vec![
        (Some("ok-1".into()), named("a")),
        (Some("too-big".into()), Record::new().with("blob", "x".repeat(256))),
        (Some("ok-2".into()), named("b")),
    ]);

    assert!(matches!(result, Err(StoreError::Serialization(_))));
    assert_eq!(table.get("ok-1").unwrap(), None);
    assert_eq!(table.get("ok-2").unwrap(), None);
    assert!(table.scan_keys().unwrap().is_empty());
}

#[test]
fn test_put_many_empty_batch() {
    let (_temp, table) = setup_temp_table();

    let keys = table.put_many(Vec::new()).unwrap();

    assert!(keys.is_empty());
}

#[test]
fn test_delete_many_skips_absent_keys() {
    let (_temp, table) = setup_temp_table();
    for key in ["a", "b", "c"] {
        table.put(Some(key.into()), named(key)).unwrap();
    }

    table
        .delete_many(&["a".to_string(), "missing".to_string(), "c".to_string()])
        .unwrap();

    assert_eq!(table.scan_keys().unwrap(), vec!["b".to_string()]);
}

// =============================================================================
// Multi-get Tests
// =============================================================================

#[test]
fn test_get_many_partial_presence() {
    let (_temp, table) = setup_temp_table();
    table.put(Some("a".into()), named("A")).unwrap();
    table.put(Some("c".into()), named("C")).unwrap();

    let result = table
        .get_many(&["a".to_string(), "b".to_string(), "c".to_string()])
        .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result["a"].as_ref().unwrap().get("name"), Some(&Value::from("A")));
    assert_eq!(result["b"], None);
    assert_eq!(result["c"].as_ref().unwrap().get("name"), Some(&Value::from("C")));
}

#[test]
fn test_get_many_no_keys() {
    let (_temp, table) = setup_temp_table();

    assert!(table.get_many(&[]).unwrap().is_empty());
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scans_follow_key_order() {
    let (_temp, table) = setup_temp_table();
    for key in ["banana", "apple", "cherry", "Zebra"] {
        table.put(Some(key.into()), named(key)).unwrap();
    }

    let keys = table.scan_keys().unwrap();
    assert_eq!(keys, vec!["Zebra", "apple", "banana", "cherry"]);

    let items = table.scan_items().unwrap();
    assert_eq!(items.keys().cloned().collect::<Vec<_>>(), keys);
    for (key, record) in &items {
        assert_eq!(record.id(), Some(key.as_str()));
    }

    let values = table.scan_values().unwrap();
    let names: Vec<_> = values.iter().map(|r| r.get("name").cloned()).collect();
    assert_eq!(
        names,
        vec![
            Some(Value::from("Zebra")),
            Some(Value::from("apple")),
            Some(Value::from("banana")),
            Some(Value::from("cherry")),
        ]
    );
}

#[test]
fn test_scans_on_empty_table() {
    let (_temp, table) = setup_temp_table();

    assert!(table.scan_keys().unwrap().is_empty());
    assert!(table.scan_items().unwrap().is_empty());
    assert!(table.scan_values().unwrap().is_empty());
}

#[test]
fn test_scan_prefix() {
    let (_temp, table) = setup_temp_table();
    for key in ["user:1", "user:2", "users", "order:1", "user;"] {
        table.put(Some(key.into()), named(key)).unwrap();
    }

    let items = table.scan_prefix("user:").unwrap();

    assert_eq!(
        items.keys().cloned().collect::<Vec<_>>(),
        vec!["user:1".to_string(), "user:2".to_string()]
    );
}

#[test]
fn test_scan_prefix_with_prefix_extractor() {
    let temp_dir = TempDir::new().unwrap();
    let def = TableDef::new("t").with_prefix_length(3);
    let table = Table::open(temp_dir.path(), &def, RecordCodec::default()).unwrap();
    for key in ["aaa1", "aaa2", "aab1", "ab", "b"] {
        table.put(Some(key.into()), named(key)).unwrap();
    }

    // Shorter, equal and longer than the extractor's prefix length
    assert_eq!(table.scan_prefix("a").unwrap().len(), 4);
    assert_eq!(table.scan_prefix("aaa").unwrap().len(), 2);
    assert_eq!(table.scan_prefix("aab1").unwrap().len(), 1);
    assert_eq!(table.scan_keys().unwrap().len(), 5);
}

#[test]
fn test_scan_prefix_no_match() {
    let (_temp, table) = setup_temp_table();
    table.put(Some("a".into()), named("a")).unwrap();

    assert!(table.scan_prefix("zzz").unwrap().is_empty());
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_preserves_data() {
    let temp_dir = TempDir::new().unwrap();
    let def = TableDef::new("t");

    {
        let table = Table::open(temp_dir.path(), &def, RecordCodec::default()).unwrap();
        table.put(Some("k".into()), named("persisted")).unwrap();
        table.put(Some("gone".into()), named("x")).unwrap();
        table.delete("gone").unwrap();
    }

    let table = Table::open(temp_dir.path(), &def, RecordCodec::default()).unwrap();
    let stored = table.get("k").unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&Value::from("persisted")));
    assert_eq!(table.get("gone").unwrap(), None);
}

// =============================================================================
// Engine Failure Tests
// =============================================================================

#[test]
fn test_second_open_fails_on_engine_lock() {
    let (temp_dir, table) = setup_temp_table();
    table.put(Some("a".to_string()), named("Ada")).unwrap();

    let result = Table::open(temp_dir.path(), &TableDef::new("t"), RecordCodec::default());

    match result {
        Err(StoreError::StorageEngine(e)) => assert!(!e.to_string().is_empty()),
        other => panic!("Expected StorageEngine error, got {:?}", other.map(|t| t.name().to_string())),
    }

    // The first handle is unaffected
    assert!(table.get("a").unwrap().is_some());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_distinct_keys() {
    let (_temp, table) = setup_temp_table();
    let table = Arc::new(table);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("t{}-{:03}", t, i);
                    table.put(Some(key), Record::new().with("i", i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(table.scan_keys().unwrap().len(), 200);
}
