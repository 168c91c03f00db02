//! WAL Recovery
//!
//! Rebuilds a table's memtable by replaying its WAL.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use crate::memtable::MemTable;

use super::{WalReader, WalRecord};

/// Handles WAL recovery after a restart
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Mutation records applied after the last checkpoint
    pub mutations_replayed: u64,

    /// Checkpoint markers encountered
    pub checkpoints_seen: u64,

    /// Distinct rows in the rebuilt memtable
    pub rows_recovered: usize,

    /// Whether a partially written tail line was removed
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Replay a WAL file into a fresh memtable
    ///
    /// This will:
    /// 1. Read every record from the start of the file
    /// 2. Reset the memtable at each checkpoint
    /// 3. Apply mutations exactly as a live put would
    /// 4. Truncate a partially written final line
    ///
    /// A missing file recovers to an empty memtable.
    pub fn recover(path: &Path) -> Result<(MemTable, RecoveryResult)> {
        let (memtable, result, valid_len) = Self::replay(path)?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                "Truncated partial record at end of WAL {} (kept {} bytes)",
                path.display(),
                valid_len
            );
        }

        Ok((memtable, result))
    }

    /// Replay a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::replay(path).map(|(_, result, _)| result)
    }

    fn replay(path: &Path) -> Result<(MemTable, RecoveryResult, u64)> {
        let mut memtable = MemTable::new();
        let mut result = RecoveryResult::default();

        if !path.exists() {
            return Ok((memtable, result, 0));
        }

        let mut reader = WalReader::open(path)?;
        while let Some(record) = reader.next_record()? {
            match record {
                WalRecord::Checkpoint => {
                    memtable.clear();
                    result.checkpoints_seen += 1;
                    result.mutations_replayed = 0;
                }
                WalRecord::Mutation {
                    row_key,
                    column_key,
                    value,
                } => {
                    memtable.put_column(&row_key, &column_key, &value);
                    result.mutations_replayed += 1;
                }
            }
        }

        result.rows_recovered = memtable.row_count();
        result.was_truncated = reader.has_torn_tail();

        Ok((memtable, result, reader.valid_len()))
    }
}
