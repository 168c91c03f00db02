//! TabletKV Server Binary
//!
//! Starts one node: opens the engine, serves the TCP protocol and joins the
//! cluster.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tabletkv::cluster::{join_cluster, store_hash};
use tabletkv::network::Server;
use tabletkv::protocol::ServerNode;
use tabletkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// TabletKV Server
#[derive(Parser, Debug)]
#[command(name = "tabletkv-server")]
#[command(about = "Column-family key-value tablet server")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./tabletkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8181")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(long, default_value = "1024")]
    max_connections: usize,

    /// Default memtable row limit for new tables
    #[arg(short = 'm', long, default_value = "9000")]
    memtable_limit: usize,

    /// Master address; omit to run as the master
    #[arg(long)]
    master: Option<String>,

    /// Number of nodes in the cluster (master only)
    #[arg(short = 'n', long, default_value = "1")]
    num_nodes: usize,

    /// Name hashed into this node's ring position (defaults to the listen address)
    #[arg(long)]
    node_name: Option<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabletkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let node_name = args.node_name.clone().unwrap_or_else(|| args.listen.clone());
    let node_id = store_hash(&node_name);

    tracing::info!("TabletKV Server v{}", tabletkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Node {} (id {})", node_name, node_id);

    let mut builder = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .default_memtable_limit(args.memtable_limit)
        .num_nodes(args.num_nodes)
        .node_id(node_id);
    if let Some(master) = &args.master {
        builder = builder.master_addr(master);
    }
    let config = builder.build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config.clone(), Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    let advertised = match server.local_addr() {
        Ok(addr) => addr.to_string(),
        Err(e) => {
            tracing::error!("Failed to read listen address: {}", e);
            std::process::exit(1);
        }
    };

    let server_thread = thread::spawn(move || server.run());

    // The master registers with itself like every other node
    let master_addr = config.master_addr.clone().unwrap_or_else(|| advertised.clone());
    let node = ServerNode {
        host_port: advertised,
        node_id,
    };
    match join_cluster(
        &master_addr,
        &node,
        Duration::from_millis(config.join_retry_ms),
        None,
    ) {
        Ok(nodes) => {
            if !config.is_master() {
                engine.membership().install(nodes);
            }
            tracing::info!("Cluster ready");
        }
        Err(e) => {
            tracing::error!("Failed to join cluster via {}: {}", master_addr, e);
            std::process::exit(1);
        }
    }

    match server_thread.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
        Err(_) => {
            tracing::error!("Server thread panicked");
            std::process::exit(1);
        }
    }

    if let Ok(engine) = Arc::try_unwrap(engine) {
        if let Err(e) = engine.close() {
            tracing::error!("Failed to close engine: {}", e);
        }
    }

    tracing::info!("Server stopped");
}
