//! Row Index
//!
//! Ordered, persistent map from row key to data log line numbers, backed by
//! an embedded redb database shared by every table on the node. Each table
//! owns one redb table (its namespace) named after it.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::error::Result;

/// Shared row index for all tables of a node
///
/// Values are JSON arrays of ascending line numbers, e.g. `[0,17,42]`.
pub struct RowIndex {
    db: Database,
    path: PathBuf,
}

impl RowIndex {
    /// Open or create the index database
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Line numbers holding fragments of `row_key`, ascending
    ///
    /// A missing namespace or row yields an empty list.
    pub fn lookup(&self, table: &str, row_key: &str) -> Result<Vec<u64>> {
        let txn = self.db.begin_read()?;
        let namespace = match txn.open_table(Self::namespace(table)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let raw = namespace.get(row_key)?.map(|guard| guard.value().to_string());
        match raw {
            Some(json) => Self::decode_offsets(&json),
            None => Ok(Vec::new()),
        }
    }

    /// Line numbers for every row in `[start, end]`, in key order
    ///
    /// An inverted range yields nothing.
    pub fn scan(&self, table: &str, start: &str, end: &str) -> Result<Vec<(String, Vec<u64>)>> {
        if start > end {
            return Ok(Vec::new());
        }

        let txn = self.db.begin_read()?;
        let namespace = match txn.open_table(Self::namespace(table)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for entry in namespace.range(start..=end)? {
            let (key, value) = entry?;
            rows.push((key.value().to_string(), Self::decode_offsets(value.value())?));
        }
        Ok(rows)
    }

    /// Append one new line number per flushed row
    ///
    /// All updates commit in a single write transaction: either every row
    /// of the flush is indexed or none is.
    pub fn record_flush(&self, table: &str, placed: &[(String, u64)]) -> Result<()> {
        if placed.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin_write()?;
        {
            let mut namespace = txn.open_table(Self::namespace(table))?;
            for (row_key, offset) in placed {
                let existing = namespace
                    .get(row_key.as_str())?
                    .map(|guard| guard.value().to_string());

                let mut offsets = match existing {
                    Some(json) => Self::decode_offsets(&json)?,
                    None => Vec::new(),
                };
                offsets.push(*offset);

                let encoded = serde_json::to_string(&offsets)?;
                namespace.insert(row_key.as_str(), encoded.as_str())?;
            }
        }
        txn.commit()?;

        Ok(())
    }

    /// Remove a table's namespace. Returns whether it existed.
    pub fn drop_namespace(&self, table: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let existed = txn.delete_table(Self::namespace(table))?;
        txn.commit()?;
        Ok(existed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn namespace(table: &str) -> TableDefinition<'_, &'static str, &'static str> {
        TableDefinition::new(table)
    }

    fn decode_offsets(json: &str) -> Result<Vec<u64>> {
        let mut offsets: Vec<u64> = serde_json::from_str(json)?;
        offsets.sort_unstable();
        Ok(offsets)
    }
}
