//! Tests for TableMetadata
//!
//! These tests verify:
//! - Store/load preserves every field
//! - Checksum mismatches and short files are detected
//! - Storing replaces the previous version

use std::fs;

use tabletkv::table::TableMetadata;
use tabletkv::TabletError;
use tempfile::TempDir;

#[test]
fn test_store_and_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("users.meta");

    let metadata = TableMetadata::new("users", vec!["name".into(), "addr".into()], 42);
    metadata.store(&path).unwrap();

    let loaded = TableMetadata::load(&path).unwrap();
    assert_eq!(loaded, metadata);
    assert_eq!(loaded.column_families, vec!["name", "addr"]);
    assert!(loaded.creation_time > 0);
}

#[test]
fn test_store_replaces_previous() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.meta");

    let mut metadata = TableMetadata::new("t", vec![], 10);
    metadata.store(&path).unwrap();
    metadata.memtable_limit = 99;
    metadata.store(&path).unwrap();

    assert_eq!(TableMetadata::load(&path).unwrap().memtable_limit, 99);
    assert!(!temp.path().join("t.meta.tmp").exists());
}

#[test]
fn test_checksum_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.meta");
    TableMetadata::new("t", vec!["cf".into()], 10).store(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        TableMetadata::load(&path),
        Err(TabletError::MetadataCorruption(_))
    ));
}

#[test]
fn test_short_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.meta");
    fs::write(&path, [1u8, 2]).unwrap();

    assert!(matches!(
        TableMetadata::load(&path),
        Err(TabletError::MetadataCorruption(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        TableMetadata::load(&temp.path().join("nope.meta")),
        Err(TabletError::Io(_))
    ));
}
