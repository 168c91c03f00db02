//! Tests for RowFragment
//!
//! These tests verify:
//! - Column insert and overwrite
//! - Merge precedence (the merged-in fragment wins)
//! - JSON encoding used by the data log and replies

use std::collections::BTreeMap;

use tabletkv::memtable::RowFragment;
use tabletkv::TabletError;

#[test]
fn test_insert_and_get() {
    let mut fragment = RowFragment::new();
    assert!(fragment.is_empty());

    fragment.insert("cf:a", "1");
    fragment.insert("cf:b", "2");

    assert_eq!(fragment.len(), 2);
    assert_eq!(fragment.get("cf:a"), Some("1"));
    assert_eq!(fragment.get("cf:missing"), None);
}

#[test]
fn test_insert_overwrites() {
    let mut fragment = RowFragment::new();
    fragment.insert("cf:a", "old");
    fragment.insert("cf:a", "new");

    assert_eq!(fragment.len(), 1);
    assert_eq!(fragment.get("cf:a"), Some("new"));
}

#[test]
fn test_merge_other_wins_on_collision() {
    let mut base: RowFragment = [("cf:a", "1"), ("cf:b", "2")].into_iter().collect();
    let newer: RowFragment = [("cf:b", "20"), ("cf:c", "30")].into_iter().collect();

    base.merge(newer);

    let expected: BTreeMap<String, String> = [("cf:a", "1"), ("cf:b", "20"), ("cf:c", "30")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(base.columns(), &expected);
}

#[test]
fn test_json_is_plain_column_map() {
    let fragment: RowFragment = [("cf:b", "2"), ("cf:a", "1")].into_iter().collect();
    assert_eq!(fragment.to_json().unwrap(), r#"{"cf:a":"1","cf:b":"2"}"#);
}

#[test]
fn test_json_round_trip_with_awkward_values() {
    let fragment: RowFragment = [("cf:q", "quote \" and | pipe"), ("cf:u", "ünïcödé")]
        .into_iter()
        .collect();

    let decoded = RowFragment::from_json(&fragment.to_json().unwrap()).unwrap();
    assert_eq!(decoded, fragment);
}

#[test]
fn test_empty_fragment_json() {
    assert_eq!(RowFragment::new().to_json().unwrap(), "{}");
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(matches!(
        RowFragment::from_json("not json"),
        Err(TabletError::Json(_))
    ));
}

#[test]
fn test_into_columns() {
    let mut map = BTreeMap::new();
    map.insert("cf:a".to_string(), "1".to_string());
    let fragment = RowFragment::from(map.clone());
    assert_eq!(fragment.into_columns(), map);
}
