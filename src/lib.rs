//! # TabletKV
//!
//! One node of a column-family key-value store:
//! - Per-table memtable backed by a line-oriented, fsync'd write-ahead log
//! - Append-only data log of flushed row fragments
//! - Ordered row index (redb) mapping row keys to data log lines
//! - Framed TCP protocol and a small cluster membership layer
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one thread per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TabletService
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Engine / TableCatalog                        │
//! │            (name → open table, membership)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ per-table RwLock
//!          ┌────────────┼─────────────┬──────────────┐
//!          ▼            ▼             ▼              ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌────────────┐
//!   │    WAL    │ │ MemTable  │ │  DataLog  │ │  RowIndex  │
//!   │ (append)  │ │ (BTreeMap)│ │ (append)  │ │   (redb)   │
//!   └───────────┘ └───────────┘ └───────────┘ └────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod storage;
pub mod table;
pub mod catalog;
pub mod protocol;
pub mod service;
pub mod network;
pub mod cluster;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TabletError};
pub use config::Config;
pub use engine::Engine;
pub use service::TabletService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TabletKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
