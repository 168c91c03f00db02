//! Configuration for TabletKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, TabletError};

/// Default number of buffered rows before a table flushes its memtable
pub const DEFAULT_MEMTABLE_LIMIT: usize = 9000;

/// Main configuration for a TabletKV node
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {table}.meta     (table metadata)
    ///     ├── {table}.ydb      (append-only data log)
    ///     ├── {table}.wal      (write-ahead log)
    ///     └── index.redb       (row index, one namespace per table)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Row-count limit given to newly created tables
    pub default_memtable_limit: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Cluster Configuration
    // -------------------------------------------------------------------------
    /// Address of the master node; `None` makes this node the master
    pub master_addr: Option<String>,

    /// Number of nodes expected to register before the cluster is ready
    pub num_nodes: usize,

    /// Position of this node on the hash ring
    pub node_id: u32,

    /// Delay between registration attempts while joining (milliseconds)
    pub join_retry_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tabletkv_data"),
            default_memtable_limit: DEFAULT_MEMTABLE_LIMIT,
            listen_addr: "127.0.0.1:8181".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            master_addr: None,
            num_nodes: 1,
            node_id: 0,
            join_retry_ms: 1000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether this node accepts registrations from its peers
    pub fn is_master(&self) -> bool {
        self.master_addr.is_none()
    }

    /// Reject settings no node can run with
    pub fn validate(&self) -> Result<()> {
        if self.num_nodes == 0 {
            return Err(TabletError::Config("num_nodes must be at least 1".to_string()));
        }
        if self.max_connections == 0 {
            return Err(TabletError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.master_addr.as_deref() == Some("") {
            return Err(TabletError::Config("master_addr is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the row-count limit for newly created tables
    pub fn default_memtable_limit(mut self, rows: usize) -> Self {
        self.config.default_memtable_limit = rows;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Join the cluster run by the master at `addr`
    pub fn master_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.master_addr = Some(addr.into());
        self
    }

    /// Set the number of nodes in the cluster
    pub fn num_nodes(mut self, count: usize) -> Self {
        self.config.num_nodes = count;
        self
    }

    /// Set this node's ring position
    pub fn node_id(mut self, id: u32) -> Self {
        self.config.node_id = id;
        self
    }

    /// Set the registration retry delay (in milliseconds)
    pub fn join_retry_ms(mut self, ms: u64) -> Self {
        self.config.join_retry_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
