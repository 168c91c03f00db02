//! MemTable implementation
//!
//! BTreeMap-based buffer of row fragments.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;

use super::RowFragment;

/// In-memory table for recent writes
#[derive(Debug, Default)]
pub struct MemTable {
    rows: BTreeMap<String, RowFragment>,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a single column into a row, creating the row if absent
    pub fn put_column(&mut self, row_key: &str, column_key: &str, value: &str) {
        self.rows
            .entry(row_key.to_string())
            .or_default()
            .insert(column_key, value);
    }

    /// Merge a set of column updates into a row
    ///
    /// Returns the number of distinct buffered rows afterwards.
    pub fn put_row<'a, I>(&mut self, row_key: &str, updates: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let fragment = self.rows.entry(row_key.to_string()).or_default();
        for (column_key, value) in updates {
            fragment.insert(column_key.as_str(), value.as_str());
        }
        self.rows.len()
    }

    /// Get the buffered fragment for a row
    pub fn get(&self, row_key: &str) -> Option<&RowFragment> {
        self.rows.get(row_key)
    }

    /// Buffered row keys within `[start, end]`
    ///
    /// An inverted range yields nothing.
    pub fn keys_in_range(&self, start: &str, end: &str) -> Vec<&str> {
        if start > end {
            return Vec::new();
        }
        self.rows
            .range::<str, _>((Bound::Included(start), Bound::Included(end)))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Number of distinct buffered rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the buffered row count exceeds `limit`
    pub fn should_flush(&self, limit: usize) -> bool {
        self.rows.len() > limit
    }

    /// Iterate rows in key order (for flush)
    pub fn iter(&self) -> btree_map::Iter<'_, String, RowFragment> {
        self.rows.iter()
    }

    /// Drop every buffered row (after a successful flush)
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
