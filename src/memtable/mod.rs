//! MemTable Module
//!
//! In-memory buffer of not-yet-flushed row fragments for one table.
//!
//! ## Responsibilities
//! - Merge column updates into the buffered fragment of each row
//! - Track the number of distinct buffered rows for flush triggers
//! - Ordered iteration for flush and range reads
//!
//! ## Data Structure Choice
//! BTreeMap keyed by row key. The memtable carries no lock of its own: it
//! lives inside the owning table's read/write lock, which already serializes
//! every mutation against flushes and reads.

mod table;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use table::MemTable;

/// One write generation's worth of columns for a row
///
/// Keys are qualified column keys (`family:qualifier`). Serializes as a flat
/// JSON object, which is both the data log payload and the `GetRow` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowFragment {
    columns: BTreeMap<String, String>,
}

impl RowFragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single column, overwriting any previous value
    pub fn insert(&mut self, column_key: impl Into<String>, value: impl Into<String>) {
        self.columns.insert(column_key.into(), value.into());
    }

    /// Layer `other` on top of this fragment; `other` wins on collision
    pub fn merge(&mut self, other: RowFragment) {
        self.columns.extend(other.columns);
    }

    /// Look up one qualified column
    pub fn get(&self, column_key: &str) -> Option<&str> {
        self.columns.get(column_key).map(String::as_str)
    }

    pub fn columns(&self) -> &BTreeMap<String, String> {
        &self.columns
    }

    pub fn into_columns(self) -> BTreeMap<String, String> {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Serialize the column map as a JSON object
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a fragment from a JSON object
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<BTreeMap<String, String>> for RowFragment {
    fn from(columns: BTreeMap<String, String>) -> Self {
        Self { columns }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowFragment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
