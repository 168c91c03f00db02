//! Tests for DataLog
//!
//! These tests verify:
//! - Line format and line numbering across appends and reopens
//! - Reading lines by number in one pass
//! - Partial trailing lines are cut off on open
//! - Index/log disagreement is reported as corruption

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tabletkv::memtable::RowFragment;
use tabletkv::storage::DataLog;
use tabletkv::TabletError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("t.ydb");
    DataLog::create(&path).unwrap();
    (temp_dir, path)
}

/// One single-column row per (row, column, value) entry
fn rows(entries: &[(&str, &str, &str)]) -> BTreeMap<String, RowFragment> {
    entries
        .iter()
        .map(|(key, column, value)| (key.to_string(), [(*column, *value)].into_iter().collect()))
        .collect()
}

// =============================================================================
// Create / Append
// =============================================================================

#[test]
fn test_create_is_empty_and_exclusive() {
    let (_temp, path) = setup_temp_log();

    let log = DataLog::open(&path).unwrap();
    assert_eq!(log.line_count(), 0);
    assert!(DataLog::create(&path).is_err());
}

#[test]
fn test_append_writes_key_and_json() {
    let (_temp, path) = setup_temp_log();
    let mut log = DataLog::open(&path).unwrap();

    let batch = rows(&[("r1", "cf:a", "1"), ("r2", "cf:b", "2")]);
    let placed = log.append_rows(&batch).unwrap();

    assert_eq!(placed, vec![("r1".to_string(), 0), ("r2".to_string(), 1)]);
    assert_eq!(log.line_count(), 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "r1|{\"cf:a\":\"1\"}\nr2|{\"cf:b\":\"2\"}\n"
    );
}

#[test]
fn test_line_numbers_continue_across_reopen() {
    let (_temp, path) = setup_temp_log();
    {
        let mut log = DataLog::open(&path).unwrap();
        log.append_rows(&rows(&[("a", "cf:x", "1"), ("b", "cf:x", "1")]))
            .unwrap();
    }

    let mut log = DataLog::open(&path).unwrap();
    assert_eq!(log.line_count(), 2);
    let placed = log.append_rows(&rows(&[("a", "cf:x", "2")])).unwrap();
    assert_eq!(placed, vec![("a".to_string(), 2)]);
}

#[test]
fn test_append_nothing() {
    let (_temp, path) = setup_temp_log();
    let mut log = DataLog::open(&path).unwrap();

    assert!(log.append_rows(&BTreeMap::new()).unwrap().is_empty());
    assert_eq!(log.line_count(), 0);
}

// =============================================================================
// Reads
// =============================================================================

#[test]
fn test_read_lines_any_order() {
    let (_temp, path) = setup_temp_log();
    let mut log = DataLog::open(&path).unwrap();
    log.append_rows(&rows(&[
        ("a", "cf:x", "0"),
        ("b", "cf:x", "1"),
        ("c", "cf:x", "2"),
    ]))
    .unwrap();

    let lines = log.read_lines(&[2, 0, 2]).unwrap();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].0, 0);
    assert_eq!(lines[0].1, "a");
    assert_eq!(lines[1].0, 2);
    assert_eq!(lines[1].2.get("cf:x"), Some("2"));
}

#[test]
fn test_read_fragments_oldest_first() {
    let (_temp, path) = setup_temp_log();
    let mut log = DataLog::open(&path).unwrap();
    log.append_rows(&rows(&[("r", "cf:a", "old")])).unwrap();
    log.append_rows(&rows(&[("other", "cf:a", "x")])).unwrap();
    log.append_rows(&rows(&[("r", "cf:a", "new")])).unwrap();

    let fragments = log.read_fragments("r", &[2, 0]).unwrap();

    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].get("cf:a"), Some("old"));
    assert_eq!(fragments[1].get("cf:a"), Some("new"));
}

#[test]
fn test_read_fragments_wrong_row_is_corruption() {
    let (_temp, path) = setup_temp_log();
    let mut log = DataLog::open(&path).unwrap();
    log.append_rows(&rows(&[("a", "cf:x", "1")])).unwrap();

    assert!(matches!(
        log.read_fragments("b", &[0]),
        Err(TabletError::DataLogCorruption(_))
    ));
}

#[test]
fn test_read_past_end_is_corruption() {
    let (_temp, path) = setup_temp_log();
    let mut log = DataLog::open(&path).unwrap();
    log.append_rows(&rows(&[("a", "cf:x", "1")])).unwrap();

    assert!(matches!(
        log.read_lines(&[5]),
        Err(TabletError::DataLogCorruption(_))
    ));
}

#[test]
fn test_read_bad_json_is_corruption() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "a|{not json\n").unwrap();
    let log = DataLog::open(&path).unwrap();

    assert!(matches!(
        log.read_lines(&[0]),
        Err(TabletError::DataLogCorruption(_))
    ));
}

#[test]
fn test_read_invalid_utf8_is_corruption() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, b"a|{}\nb|{\"cf:x\":\"\xff\"}\n").unwrap();
    let log = DataLog::open(&path).unwrap();

    assert_eq!(log.read_lines(&[0]).unwrap().len(), 1);
    assert!(matches!(
        log.read_lines(&[1]),
        Err(TabletError::DataLogCorruption(msg)) if msg.contains("line 1")
    ));
}

#[test]
fn test_read_nothing() {
    let (_temp, path) = setup_temp_log();
    let log = DataLog::open(&path).unwrap();
    assert!(log.read_lines(&[]).unwrap().is_empty());
}

// =============================================================================
// Partial Lines
// =============================================================================

#[test]
fn test_open_truncates_partial_line() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "a|{\"cf:x\":\"1\"}\nb|{\"cf:x\"").unwrap();

    let mut log = DataLog::open(&path).unwrap();
    assert_eq!(log.line_count(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a|{\"cf:x\":\"1\"}\n");

    let placed = log.append_rows(&rows(&[("c", "cf:x", "3")])).unwrap();
    assert_eq!(placed[0].1, 1);
    assert_eq!(log.read_lines(&[1]).unwrap()[0].1, "c");
}
