//! Engine Module
//!
//! One node's request handler: the table catalog plus cluster membership,
//! exposed through [`TabletService`].
//!
//! ## Responsibilities
//! - Own the shared row index and the catalog of open tables
//! - Map row-level calls onto the open table, answering `TableNotFound`
//!   when the table is not open here
//! - Serialize row fragments for replies
//! - Answer registration calls when this node is the master

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::TableCatalog;
use crate::cluster::Membership;
use crate::config::Config;
use crate::error::{Result, TabletError};
use crate::protocol::{
    CloseTableArgs, CloseTableReply, Command, CreateTableArgs, CreateTableReply,
    DestroyTableArgs, DestroyTableReply, GetColumnByRowArgs, GetColumnByRowReply, GetRowArgs,
    GetRowReply, GetRowsArgs, GetRowsReply, GetServersArgs, GetServersReply, MemTableLimitArgs,
    MemTableLimitReply, OpenTableArgs, OpenTableReply, PutRowArgs, PutRowReply,
    RegisterServerArgs, RegisterServerReply, Reply, Status, TableHandle,
};
use crate::service::{dispatch, TabletService};
use crate::storage::RowIndex;
use crate::table::{Table, TableMetadata};

/// The storage engine of one node
pub struct Engine {
    config: Config,
    catalog: TableCatalog,
    membership: Membership,
}

impl Engine {
    const INDEX_FILENAME: &'static str = "index.redb";

    /// Open or create an engine with the given config
    ///
    /// No table is opened; tables are opened explicitly and their WALs are
    /// replayed at that point.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let index = RowIndex::open(&config.data_dir.join(Self::INDEX_FILENAME))?;
        let catalog = TableCatalog::new(
            &config.data_dir,
            Arc::new(index),
            config.default_memtable_limit,
        );

        let membership = if config.is_master() {
            Membership::master(config.num_nodes)
        } else {
            Membership::member()
        };

        tracing::info!(
            "Engine opened at {} (node {}, {})",
            config.data_dir.display(),
            config.node_id,
            if config.is_master() { "master" } else { "member" }
        );

        Ok(Self {
            config,
            catalog,
            membership,
        })
    }

    /// Open an engine with default settings at the given path
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a decoded command
    pub fn execute(&self, command: Command) -> Result<Reply> {
        dispatch(self, command)
    }

    /// Flush an open table's memtable now
    pub fn flush_table(&self, table_name: &str) -> Result<Status> {
        match self.catalog.get(table_name) {
            Some(table) => match table.flush() {
                Ok(_) => Ok(Status::Ok),
                Err(TabletError::TableClosed(_)) => Ok(Status::TableNotFound),
                Err(e) => Err(e),
            },
            None => Ok(Status::TableNotFound),
        }
    }

    /// Close every open table and shut down
    ///
    /// Memtables are not flushed; their contents are replayed from the WAL
    /// on the next open.
    pub fn close(self) -> Result<()> {
        self.catalog.close_all()?;
        tracing::info!("Engine at {} closed", self.config.data_dir.display());
        Ok(())
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn table(&self, table_name: &str) -> Option<Arc<Table>> {
        self.catalog.get(table_name)
    }
}

fn handle(metadata: TableMetadata) -> TableHandle {
    TableHandle {
        table_name: metadata.table_name,
        column_families: metadata.column_families,
        memtable_limit: metadata.memtable_limit,
        creation_time: metadata.creation_time,
    }
}

impl TabletService for Engine {
    fn register_server(&self, args: RegisterServerArgs) -> Result<RegisterServerReply> {
        let (status, servers) = self.membership.register(args.server_info)?;
        Ok(RegisterServerReply { status, servers })
    }

    fn get_servers(&self, _args: GetServersArgs) -> Result<GetServersReply> {
        let (status, servers) = self.membership.servers();
        Ok(GetServersReply { status, servers })
    }

    fn create_table(&self, args: CreateTableArgs) -> Result<CreateTableReply> {
        let (status, metadata) = self.catalog.create_table(
            &args.table_name,
            args.column_families,
            args.memtable_limit,
        )?;
        Ok(CreateTableReply {
            status,
            table_handle: metadata.map(handle),
        })
    }

    fn open_table(&self, args: OpenTableArgs) -> Result<OpenTableReply> {
        let (status, metadata) = self.catalog.open_table(&args.table_name)?;
        Ok(OpenTableReply {
            status,
            table_handle: metadata.map(handle),
        })
    }

    fn close_table(&self, args: CloseTableArgs) -> Result<CloseTableReply> {
        let status = self.catalog.close_table(&args.table_name)?;
        Ok(CloseTableReply { status })
    }

    fn destroy_table(&self, args: DestroyTableArgs) -> Result<DestroyTableReply> {
        let status = self.catalog.destroy_table(&args.table_name)?;
        Ok(DestroyTableReply { status })
    }

    fn put_row(&self, args: PutRowArgs) -> Result<PutRowReply> {
        let Some(table) = self.table(&args.table_name) else {
            return Ok(PutRowReply {
                status: Status::TableNotFound,
            });
        };

        let status = match table.put_row(&args.row_key, &args.updated_columns) {
            Ok(()) => Status::Ok,
            Err(TabletError::TableClosed(_)) => Status::TableNotFound,
            Err(e) => return Err(e),
        };
        Ok(PutRowReply { status })
    }

    fn get_row(&self, args: GetRowArgs) -> Result<GetRowReply> {
        let Some(table) = self.table(&args.table_name) else {
            return Ok(GetRowReply {
                status: Status::TableNotFound,
                row: String::new(),
            });
        };

        match table.get_row(&args.row_key) {
            Ok(row) => Ok(GetRowReply {
                status: Status::Ok,
                row: row.to_json()?,
            }),
            Err(TabletError::TableClosed(_)) => Ok(GetRowReply {
                status: Status::TableNotFound,
                row: String::new(),
            }),
            Err(e) => Err(e),
        }
    }

    fn get_rows(&self, args: GetRowsArgs) -> Result<GetRowsReply> {
        let Some(table) = self.table(&args.table_name) else {
            return Ok(GetRowsReply {
                status: Status::TableNotFound,
                rows: BTreeMap::new(),
            });
        };

        let rows = match table.get_rows(&args.start_row_key, &args.end_row_key) {
            Ok(rows) => rows,
            Err(TabletError::TableClosed(_)) => {
                return Ok(GetRowsReply {
                    status: Status::TableNotFound,
                    rows: BTreeMap::new(),
                })
            }
            Err(e) => return Err(e),
        };
        let rows = rows
            .into_iter()
            .map(|(key, row)| Ok((key, row.to_json()?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(GetRowsReply {
            status: Status::Ok,
            rows,
        })
    }

    fn get_column_by_row(&self, args: GetColumnByRowArgs) -> Result<GetColumnByRowReply> {
        let Some(table) = self.table(&args.table_name) else {
            return Ok(GetColumnByRowReply {
                status: Status::TableNotFound,
                value: String::new(),
            });
        };

        match table.get_column(&args.row_key, &args.qualified_column_key) {
            Ok(value) => Ok(GetColumnByRowReply {
                status: Status::Ok,
                value: value.unwrap_or_default(),
            }),
            Err(TabletError::TableClosed(_)) => Ok(GetColumnByRowReply {
                status: Status::TableNotFound,
                value: String::new(),
            }),
            Err(e) => Err(e),
        }
    }

    fn mem_table_limit(&self, args: MemTableLimitArgs) -> Result<MemTableLimitReply> {
        let status = self
            .catalog
            .set_memtable_limit(&args.table_name, args.new_limit_rows)?;
        Ok(MemTableLimitReply { status })
    }
}
