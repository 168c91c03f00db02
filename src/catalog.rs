//! Table Catalog
//!
//! Registry of open tables, and the lifecycle transitions between
//! nonexistent, created, open, closed and destroyed.
//!
//! ## Concurrency:
//! - `tables`: RwLock over the name → table map. Lifecycle operations hold
//!   the write side for their whole duration, so a create/open/close/destroy
//!   never interleaves with another on the same node.
//! - Row operations only clone the table's `Arc` under the read side, then
//!   release it before touching the table.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::protocol::Status;
use crate::storage::{DataLog, RowIndex};
use crate::table::{validate_table_name, Table, TableMetadata, TablePaths};

/// Registry of the tables open on this node
pub struct TableCatalog {
    data_dir: PathBuf,
    default_memtable_limit: usize,
    index: Arc<RowIndex>,
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl TableCatalog {
    pub fn new(data_dir: &Path, index: Arc<RowIndex>, default_memtable_limit: usize) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            default_memtable_limit,
            index,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Create metadata and an empty data log. The table is not opened.
    pub fn create_table(
        &self,
        name: &str,
        column_families: Vec<String>,
        memtable_limit: Option<usize>,
    ) -> Result<(Status, Option<TableMetadata>)> {
        validate_table_name(name)?;
        let tables = self.tables.write();

        let paths = self.paths(name);
        if tables.contains_key(name) || paths.exist() {
            return Ok((Status::TableExist, None));
        }

        let metadata = TableMetadata::new(
            name,
            column_families,
            memtable_limit.unwrap_or(self.default_memtable_limit),
        );

        // Leftovers from an interrupted create or destroy
        remove_if_present(&paths.wal)?;
        remove_if_present(&paths.data_log)?;
        self.index.drop_namespace(name)?;

        DataLog::create(&paths.data_log)?;
        metadata.store(&paths.metadata)?;

        tracing::info!(
            "Created table {} (families: {:?}, memtable limit: {})",
            name,
            metadata.column_families,
            metadata.memtable_limit
        );

        Ok((Status::Ok, Some(metadata)))
    }

    /// Load metadata, replay the WAL and register the table
    pub fn open_table(&self, name: &str) -> Result<(Status, Option<TableMetadata>)> {
        validate_table_name(name)?;
        let mut tables = self.tables.write();

        if tables.contains_key(name) {
            return Ok((Status::TableOpenByOther, None));
        }

        let paths = self.paths(name);
        if !paths.exist() {
            return Ok((Status::TableNotFound, None));
        }

        let metadata = TableMetadata::load(&paths.metadata)?;
        let (table, recovery) = Table::open(paths, metadata.clone(), Arc::clone(&self.index))?;

        tracing::info!(
            "Opened table {}: {} rows recovered from WAL ({} mutations, {} checkpoints{})",
            name,
            recovery.rows_recovered,
            recovery.mutations_replayed,
            recovery.checkpoints_seen,
            if recovery.was_truncated { ", torn tail removed" } else { "" }
        );

        tables.insert(name.to_string(), Arc::new(table));
        Ok((Status::Ok, Some(metadata)))
    }

    /// Persist metadata and drop the table from the registry
    ///
    /// The memtable is not flushed; its rows stay in the WAL and come back
    /// on the next open.
    pub fn close_table(&self, name: &str) -> Result<Status> {
        let mut tables = self.tables.write();

        let table = match tables.get(name) {
            Some(table) => Arc::clone(table),
            None => return Ok(Status::TableNotFound),
        };

        let metadata = table.close()?;
        tables.remove(name);
        metadata.store(&table.paths().metadata)?;

        tracing::info!("Closed table {}", name);
        Ok(Status::Ok)
    }

    /// Remove all files and the index namespace of a closed table
    pub fn destroy_table(&self, name: &str) -> Result<Status> {
        validate_table_name(name)?;
        let tables = self.tables.write();

        if tables.contains_key(name) {
            return Ok(Status::TableOpenByOther);
        }

        let paths = self.paths(name);
        if !paths.exist() {
            return Ok(Status::TableNotFound);
        }

        fs::remove_file(&paths.metadata)?;
        fs::remove_file(&paths.data_log)?;
        // Never-opened tables have no WAL yet
        remove_if_present(&paths.wal)?;
        self.index.drop_namespace(name)?;

        tracing::info!("Destroyed table {}", name);
        Ok(Status::Ok)
    }

    /// Change the persisted flush threshold of an open or closed table
    pub fn set_memtable_limit(&self, name: &str, rows: usize) -> Result<Status> {
        validate_table_name(name)?;
        let tables = self.tables.write();

        if let Some(table) = tables.get(name) {
            let metadata = table.set_memtable_limit(rows);
            metadata.store(&table.paths().metadata)?;
        } else {
            let paths = self.paths(name);
            if !paths.exist() {
                return Ok(Status::TableNotFound);
            }
            let mut metadata = TableMetadata::load(&paths.metadata)?;
            metadata.memtable_limit = rows;
            metadata.store(&paths.metadata)?;
        }

        tracing::info!("Table {}: memtable limit set to {} rows", name, rows);
        Ok(Status::Ok)
    }

    /// Look up an open table
    pub fn get(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.read().get(name).cloned()
    }

    /// Whether a table's files exist, regardless of whether it is open
    pub fn exists_on_disk(&self, name: &str) -> bool {
        validate_table_name(name).is_ok() && self.paths(name).exist()
    }

    /// Names of open tables, sorted
    pub fn open_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Close every open table
    pub fn close_all(&self) -> Result<()> {
        for name in self.open_tables() {
            self.close_table(&name)?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn paths(&self, name: &str) -> TablePaths {
        TablePaths::new(&self.data_dir, name)
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
