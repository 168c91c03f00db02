//! Tests for WalRecord
//!
//! These tests verify:
//! - Line encoding of mutations and checkpoints
//! - Decoding, including values that contain the separator
//! - Malformed line detection

use tabletkv::wal::{WalRecord, CHECKPOINT_TOKEN};
use tabletkv::TabletError;

#[test]
fn test_encode_mutation() {
    let record = WalRecord::mutation("r1", "cf:a", "hello");
    assert_eq!(record.encode(), "r1|cf:a|hello\n");
}

#[test]
fn test_encode_checkpoint() {
    assert_eq!(WalRecord::Checkpoint.encode(), format!("{}\n", CHECKPOINT_TOKEN));
}

#[test]
fn test_decode_mutation() {
    let record = WalRecord::decode("r1|cf:a|hello").unwrap();
    assert_eq!(record, WalRecord::mutation("r1", "cf:a", "hello"));
}

#[test]
fn test_decode_checkpoint() {
    assert_eq!(WalRecord::decode(CHECKPOINT_TOKEN).unwrap(), WalRecord::Checkpoint);
}

#[test]
fn test_value_may_contain_separator() {
    let record = WalRecord::decode("r1|cf:a|x|y|z").unwrap();
    assert_eq!(record, WalRecord::mutation("r1", "cf:a", "x|y|z"));
}

#[test]
fn test_empty_value() {
    let record = WalRecord::mutation("r1", "cf:a", "");
    let line = record.encode();
    assert_eq!(WalRecord::decode(line.trim_end_matches('\n')).unwrap(), record);
}

#[test]
fn test_decode_malformed() {
    for line in ["", "no-separator", "only|two"] {
        assert!(
            matches!(WalRecord::decode(line), Err(TabletError::WalCorruption(_))),
            "line {:?} should be rejected",
            line
        );
    }
}
