//! Storage Module
//!
//! Persistent storage for flushed row fragments.
//!
//! ## Responsibilities
//! - Append flushed fragments to a per-table data log (never rewritten)
//! - Map each row key to the data log lines holding its fragments
//! - Ordered row-key enumeration for range reads
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ RowIndex (index.redb)        │      │ DataLog ({table}.ydb)        │
//! │  namespace "users"           │      │  0: alice|{"cf:a":"1"}       │
//! │   alice -> [0, 2]        ────┼─────▶│  1: bob|{"cf:a":"7"}         │
//! │   bob   -> [1]               │      │  2: alice|{"cf:b":"2"}       │
//! └──────────────────────────────┘      └──────────────────────────────┘
//! ```
//! Offsets are line numbers, not byte addresses: reading a fragment scans
//! forward through the log counting newlines, which costs O(file size) per
//! read pass.

mod datalog;
mod index;

pub use datalog::DataLog;
pub use index::RowIndex;
