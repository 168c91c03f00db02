//! Error types for TabletKV
//!
//! Provides a unified error type for all operations. Protocol statuses such as
//! `TableNotFound` are carried as data in replies. `TableClosed` is the one
//! exception: it is raised inside a table and the engine answers it with
//! `TableNotFound`.

use thiserror::Error;

/// Result type alias using TabletError
pub type Result<T> = std::result::Result<T, TabletError>;

/// Unified error type for TabletKV operations
#[derive(Debug, Error)]
pub enum TabletError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("Data log corruption detected: {0}")]
    DataLogCorruption(String),

    #[error("Table metadata corruption detected: {0}")]
    MetadataCorruption(String),

    #[error("Row index error: {0}")]
    Index(#[from] redb::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Table {0} is closed")]
    TableClosed(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Remote call failed: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Cluster Errors
    // -------------------------------------------------------------------------
    #[error("Cluster error: {0}")]
    Cluster(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

// redb splits its failures across one type per API surface; they all fold
// into the umbrella `redb::Error`.
macro_rules! index_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TabletError {
                fn from(err: $ty) -> Self {
                    TabletError::Index(err.into())
                }
            }
        )*
    };
}

index_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
