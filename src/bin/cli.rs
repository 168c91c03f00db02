//! TabletKV CLI Client
//!
//! Command-line interface for interacting with TabletKV nodes.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tabletkv::cluster::Router;
use tabletkv::network::RemoteTablet;
use tabletkv::protocol::{
    CloseTableArgs, CreateTableArgs, DestroyTableArgs, GetColumnByRowArgs, GetRowArgs,
    GetRowsArgs, GetServersArgs, MemTableLimitArgs, OpenTableArgs, PutRowArgs, Status,
};
use tabletkv::{Result, TabletError, TabletService};

/// TabletKV CLI
#[derive(Parser, Debug)]
#[command(name = "tabletkv-cli")]
#[command(about = "CLI for the TabletKV column-family store")]
#[command(version)]
struct Args {
    /// Server address (the master when --routed is set)
    #[arg(short, long, default_value = "127.0.0.1:8181")]
    server: String,

    /// Route row calls by key over the cluster; table calls go to every node
    #[arg(short, long)]
    routed: bool,

    /// Per-call timeout in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List cluster members
    Servers,

    /// Create a table
    Create {
        table: String,

        /// Column family names
        families: Vec<String>,

        /// Initial memtable row limit
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Open a table
    Open { table: String },

    /// Close a table
    Close { table: String },

    /// Destroy a closed table
    Destroy { table: String },

    /// Write columns to a row
    Put {
        table: String,
        row: String,

        /// Columns as family:qualifier=value
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Read a row
    Get { table: String, row: String },

    /// Read every row in [start, end]
    Scan {
        table: String,
        start: String,
        end: String,
    },

    /// Read one column of a row
    Column {
        table: String,
        row: String,
        column: String,
    },

    /// Change a table's memtable row limit
    Limit { table: String, rows: usize },
}

/// Where calls are sent
enum Target {
    Direct(Arc<RemoteTablet>),
    Routed(Router),
}

impl Target {
    fn for_row(&self, row_key: &str) -> Arc<RemoteTablet> {
        match self {
            Target::Direct(client) => Arc::clone(client),
            Target::Routed(router) => router.client_for(row_key),
        }
    }

    fn all(&self) -> Vec<Arc<RemoteTablet>> {
        match self {
            Target::Direct(client) => vec![Arc::clone(client)],
            Target::Routed(router) => router.all_clients(),
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let timeout = Duration::from_millis(args.timeout_ms);
    let target = if args.routed {
        Target::Routed(Router::connect(&args.server, Duration::from_millis(500), Some(10))?)
    } else {
        Target::Direct(Arc::new(RemoteTablet::new(&args.server).with_timeout(timeout)))
    };

    match args.command {
        Commands::Servers => {
            let reply = RemoteTablet::new(&args.server)
                .with_timeout(timeout)
                .get_servers(GetServersArgs)?;
            print_status(reply.status);
            for node in reply.servers {
                println!("{}\t{}", node.node_id, node.host_port);
            }
        }
        Commands::Create {
            table,
            families,
            limit,
        } => {
            for client in target.all() {
                let reply = client.create_table(CreateTableArgs {
                    table_name: table.clone(),
                    column_families: families.clone(),
                    memtable_limit: limit,
                })?;
                print_node_status(&client, reply.status);
                if let Some(handle) = reply.table_handle {
                    println!(
                        "{} families={:?} limit={} created={}",
                        handle.table_name,
                        handle.column_families,
                        handle.memtable_limit,
                        handle.creation_time
                    );
                }
            }
        }
        Commands::Open { table } => {
            for client in target.all() {
                let reply = client.open_table(OpenTableArgs {
                    table_name: table.clone(),
                })?;
                print_node_status(&client, reply.status);
                if let Some(handle) = reply.table_handle {
                    println!(
                        "{} families={:?} limit={} created={}",
                        handle.table_name,
                        handle.column_families,
                        handle.memtable_limit,
                        handle.creation_time
                    );
                }
            }
        }
        Commands::Close { table } => {
            for client in target.all() {
                let reply = client.close_table(CloseTableArgs {
                    table_name: table.clone(),
                })?;
                print_node_status(&client, reply.status);
            }
        }
        Commands::Destroy { table } => {
            for client in target.all() {
                let reply = client.destroy_table(DestroyTableArgs {
                    table_name: table.clone(),
                })?;
                print_node_status(&client, reply.status);
            }
        }
        Commands::Put {
            table,
            row,
            columns,
        } => {
            let updated_columns = parse_columns(&columns)?;
            let reply = target.for_row(&row).put_row(PutRowArgs {
                table_name: table,
                row_key: row,
                updated_columns,
            })?;
            print_status(reply.status);
        }
        Commands::Get { table, row } => {
            let reply = target.for_row(&row).get_row(GetRowArgs {
                table_name: table,
                row_key: row,
            })?;
            print_status(reply.status);
            if reply.status.is_ok() {
                println!("{}", reply.row);
            }
        }
        Commands::Scan { table, start, end } => {
            // Keys in a range are spread over every node
            let mut rows = BTreeMap::new();
            for client in target.all() {
                let reply = client.get_rows(GetRowsArgs {
                    table_name: table.clone(),
                    start_row_key: start.clone(),
                    end_row_key: end.clone(),
                })?;
                if !reply.status.is_ok() {
                    print_node_status(&client, reply.status);
                }
                rows.extend(reply.rows);
            }
            for (key, row) in rows {
                println!("{}\t{}", key, row);
            }
        }
        Commands::Column { table, row, column } => {
            let reply = target.for_row(&row).get_column_by_row(GetColumnByRowArgs {
                table_name: table,
                row_key: row,
                qualified_column_key: column,
            })?;
            print_status(reply.status);
            if reply.status.is_ok() {
                println!("{}", reply.value);
            }
        }
        Commands::Limit { table, rows } => {
            for client in target.all() {
                let reply = client.mem_table_limit(MemTableLimitArgs {
                    table_name: table.clone(),
                    new_limit_rows: rows,
                })?;
                print_node_status(&client, reply.status);
            }
        }
    }

    Ok(())
}

/// Parse `family:qualifier=value` arguments
fn parse_columns(columns: &[String]) -> Result<BTreeMap<String, String>> {
    columns
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(TabletError::InvalidArgument(format!(
                "expected column=value, got {:?}",
                pair
            ))),
        })
        .collect()
}

fn print_status(status: Status) {
    if !status.is_ok() {
        println!("{:?}", status);
    }
}

fn print_node_status(client: &RemoteTablet, status: Status) {
    println!("{}: {:?}", client.addr(), status);
}
