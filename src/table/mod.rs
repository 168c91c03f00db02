//! Table Module
//!
//! One open table: memtable, WAL, data log, and a namespace in the shared
//! row index, all guarded by a single read/write lock.
//!
//! ## Locking
//! - `put_row` and `flush` hold the write lock for their whole duration,
//!   including a flush triggered by a put
//! - `get_row`, `get_rows`, `get_column` hold the read lock
//! - `close` takes the write lock and retires the instance; every later call
//!   on it fails with `TableClosed`, so a handle cloned before a close can
//!   never write next to a reopened instance
//! - No lock is shared between tables

mod metadata;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, TabletError};
use crate::memtable::{MemTable, RowFragment};
use crate::storage::{DataLog, RowIndex};
use crate::wal::{RecoveryResult, WalRecovery, WalWriter};

pub use metadata::TableMetadata;

/// On-disk locations of one table's files
#[derive(Debug, Clone)]
pub struct TablePaths {
    pub metadata: PathBuf,
    pub data_log: PathBuf,
    pub wal: PathBuf,
}

impl TablePaths {
    pub fn new(data_dir: &Path, table_name: &str) -> Self {
        Self {
            metadata: data_dir.join(format!("{}.meta", table_name)),
            data_log: data_dir.join(format!("{}.ydb", table_name)),
            wal: data_dir.join(format!("{}.wal", table_name)),
        }
    }

    /// A table exists on disk when both its metadata and data log do
    pub fn exist(&self) -> bool {
        self.metadata.is_file() && self.data_log.is_file()
    }
}

/// State guarded by the table lock
struct TableState {
    metadata: TableMetadata,
    memtable: MemTable,
    wal: WalWriter,
    data_log: DataLog,
    closed: bool,
}

impl TableState {
    fn ensure_open(&self, name: &str) -> Result<()> {
        if self.closed {
            return Err(TabletError::TableClosed(name.to_string()));
        }
        Ok(())
    }
}

/// An open table
pub struct Table {
    name: String,
    paths: TablePaths,
    index: Arc<RowIndex>,
    state: RwLock<TableState>,
}

impl Table {
    /// Open a table whose files already exist
    ///
    /// Replays the WAL into a fresh memtable before the table becomes
    /// visible.
    pub fn open(
        paths: TablePaths,
        metadata: TableMetadata,
        index: Arc<RowIndex>,
    ) -> Result<(Self, RecoveryResult)> {
        let (memtable, recovery) = WalRecovery::recover(&paths.wal)?;
        let wal = WalWriter::open(&paths.wal)?;
        let data_log = DataLog::open(&paths.data_log)?;

        let table = Self {
            name: metadata.table_name.clone(),
            paths,
            index,
            state: RwLock::new(TableState {
                metadata,
                memtable,
                wal,
                data_log,
                closed: false,
            }),
        };

        Ok((table, recovery))
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Merge column updates into a row
    ///
    /// Steps (under the write lock):
    /// 1. Append one WAL record per column and fsync
    /// 2. Merge into the memtable fragment for the row
    /// 3. Flush if the buffered row count exceeds the limit
    ///
    /// A failed flush is reported as this call's error; the update itself
    /// stays durable in the WAL and visible in the memtable.
    pub fn put_row(&self, row_key: &str, updates: &BTreeMap<String, String>) -> Result<()> {
        validate_row_key(row_key)?;
        for (column_key, value) in updates {
            validate_column(column_key, value)?;
        }

        if updates.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();
        state.ensure_open(&self.name)?;

        state.wal.append_mutations(row_key, updates)?;
        state.memtable.put_row(row_key, updates);

        tracing::trace!(
            "Table {}: put {} columns into row {:?}",
            self.name,
            updates.len(),
            row_key
        );

        if state.memtable.should_flush(state.metadata.memtable_limit) {
            self.flush_locked(&mut state)?;
        }

        Ok(())
    }

    /// Flush the memtable regardless of its size
    ///
    /// Returns the number of rows written.
    pub fn flush(&self) -> Result<usize> {
        let mut state = self.state.write();
        state.ensure_open(&self.name)?;
        self.flush_locked(&mut state)
    }

    /// Internal flush implementation (called with write lock held)
    ///
    /// Order matters: data log lines, then index entries, then the WAL
    /// checkpoint, and only then is the memtable cleared. Any failure leaves
    /// the memtable intact so the rows remain readable and recoverable.
    fn flush_locked(&self, state: &mut TableState) -> Result<usize> {
        if state.memtable.is_empty() {
            return Ok(0);
        }

        let TableState {
            memtable,
            wal,
            data_log,
            ..
        } = state;

        let placed = data_log.append_rows(memtable.iter())?;
        self.index.record_flush(&self.name, &placed)?;
        wal.append_checkpoint()?;

        let rows = placed.len();
        memtable.clear();

        tracing::debug!(
            "Table {}: flushed {} rows (data log now {} lines)",
            self.name,
            rows,
            data_log.line_count()
        );

        Ok(rows)
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Merged view of a row; empty if the row was never written
    pub fn get_row(&self, row_key: &str) -> Result<RowFragment> {
        let state = self.state.read();
        state.ensure_open(&self.name)?;
        let offsets = self.index.lookup(&self.name, row_key)?;
        let fragments = state.data_log.read_fragments(row_key, &offsets)?;
        Ok(merge_row(fragments, state.memtable.get(row_key)))
    }

    /// One qualified column of a row
    pub fn get_column(&self, row_key: &str, column_key: &str) -> Result<Option<String>> {
        let row = self.get_row(row_key)?;
        Ok(row.get(column_key).map(str::to_string))
    }

    /// Every row with a key in `[start, end]` (inclusive, lexicographic)
    ///
    /// Rows come from both the index and the memtable. All flushed fragments
    /// in the range are read in a single pass over the data log.
    pub fn get_rows(&self, start: &str, end: &str) -> Result<BTreeMap<String, RowFragment>> {
        let state = self.state.read();
        state.ensure_open(&self.name)?;

        let indexed = self.index.scan(&self.name, start, end)?;
        let all_offsets: Vec<u64> = indexed
            .iter()
            .flat_map(|(_, offsets)| offsets.iter().copied())
            .collect();

        let mut flushed: BTreeMap<String, Vec<RowFragment>> = BTreeMap::new();
        for (offset, row_key, fragment) in state.data_log.read_lines(&all_offsets)? {
            if row_key.as_str() < start || row_key.as_str() > end {
                return Err(TabletError::DataLogCorruption(format!(
                    "line {} holds row {:?} outside scanned range",
                    offset, row_key
                )));
            }
            flushed.entry(row_key).or_default().push(fragment);
        }

        let keys: BTreeSet<String> = indexed
            .into_iter()
            .map(|(key, _)| key)
            .chain(
                state
                    .memtable
                    .keys_in_range(start, end)
                    .into_iter()
                    .map(str::to_string),
            )
            .collect();

        let rows = keys
            .into_iter()
            .map(|key| {
                let fragments = flushed.remove(&key).unwrap_or_default();
                let row = merge_row(fragments, state.memtable.get(&key));
                (key, row)
            })
            .collect();

        Ok(rows)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn paths(&self) -> &TablePaths {
        &self.paths
    }

    /// Snapshot of the current metadata
    pub fn metadata(&self) -> TableMetadata {
        self.state.read().metadata.clone()
    }

    /// Change the flush threshold and return the updated metadata
    ///
    /// Takes effect for the next put; an over-full memtable is not flushed
    /// eagerly.
    pub fn set_memtable_limit(&self, rows: usize) -> TableMetadata {
        let mut state = self.state.write();
        state.metadata.memtable_limit = rows;
        state.metadata.clone()
    }

    /// Number of rows waiting in the memtable
    pub fn memtable_row_count(&self) -> usize {
        self.state.read().memtable.row_count()
    }

    /// Number of lines in the data log
    pub fn data_log_lines(&self) -> u64 {
        self.state.read().data_log.line_count()
    }

    /// fsync the WAL and retire this instance
    ///
    /// Waits for in-flight operations, then returns the final metadata. The
    /// memtable is not flushed.
    pub fn close(&self) -> Result<TableMetadata> {
        let mut state = self.state.write();
        state.ensure_open(&self.name)?;
        state.wal.sync()?;
        state.closed = true;
        Ok(state.metadata.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }
}

/// Layer flushed fragments oldest to newest, then the live memtable
/// fragment, so the most recent write of a column wins.
fn merge_row(flushed: Vec<RowFragment>, live: Option<&RowFragment>) -> RowFragment {
    let mut merged = RowFragment::new();
    for fragment in flushed {
        merged.merge(fragment);
    }
    if let Some(live) = live {
        merged.merge(live.clone());
    }
    merged
}

// =============================================================================
// Validation
// =============================================================================

/// Table names become file names and index namespaces
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TabletError::InvalidArgument("table name is empty".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(TabletError::InvalidArgument(format!(
            "table name {:?} is not a valid file name",
            name
        )));
    }
    Ok(())
}

fn validate_row_key(row_key: &str) -> Result<()> {
    if row_key.contains(['|', '\n']) {
        return Err(TabletError::InvalidArgument(format!(
            "row key {:?} contains a reserved character",
            row_key
        )));
    }
    Ok(())
}

fn validate_column(column_key: &str, value: &str) -> Result<()> {
    if column_key.contains(['|', '\n']) {
        return Err(TabletError::InvalidArgument(format!(
            "column key {:?} contains a reserved character",
            column_key
        )));
    }
    if value.contains('\n') {
        return Err(TabletError::InvalidArgument(format!(
            "value for column {:?} contains a line break",
            column_key
        )));
    }
    Ok(())
}
