//! Client-side row routing
//!
//! Each row key belongs to the node whose id is the first one at or after
//! the key's [`store_hash`] on the ring of sorted node ids, wrapping around
//! to the smallest id.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::store_hash;
use crate::error::{Result, TabletError};
use crate::network::RemoteTablet;
use crate::protocol::{GetServersArgs, ServerNode};
use crate::service::TabletService;

/// Maps row keys to nodes and keeps one client per node
pub struct Router {
    nodes: Vec<ServerNode>,
    clients: Mutex<HashMap<u32, Arc<RemoteTablet>>>,
}

impl Router {
    pub fn new(mut nodes: Vec<ServerNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(TabletError::Cluster("no servers to route to".to_string()));
        }
        nodes.sort_by_key(|n| n.node_id);
        nodes.dedup_by_key(|n| n.node_id);

        Ok(Self {
            nodes,
            clients: Mutex::new(HashMap::new()),
        })
    }

    /// Ask the master for the member list, retrying until the cluster is
    /// ready
    pub fn connect(master_addr: &str, retry: Duration, max_attempts: Option<usize>) -> Result<Self> {
        let master = RemoteTablet::new(master_addr);
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match master.get_servers(GetServersArgs) {
                Ok(reply) if reply.status.is_ok() => return Self::new(reply.servers),
                Ok(reply) => {
                    tracing::debug!("Master {} replied {:?}; waiting", master_addr, reply.status)
                }
                Err(e) => tracing::debug!("GetServers on {} failed: {}", master_addr, e),
            }

            if max_attempts.is_some_and(|max| attempt >= max) {
                return Err(TabletError::Cluster(format!(
                    "no server list from {} after {} attempts",
                    master_addr, attempt
                )));
            }
            thread::sleep(retry);
        }
    }

    /// Node owning a hash value
    pub fn select_by_hash(&self, hash: u32) -> &ServerNode {
        let idx = self.nodes.partition_point(|n| n.node_id < hash);
        // `new` guarantees at least one node
        &self.nodes[idx % self.nodes.len()]
    }

    /// Node owning a row key
    pub fn select(&self, row_key: &str) -> &ServerNode {
        self.select_by_hash(store_hash(row_key))
    }

    /// Client for the node owning `row_key`
    pub fn client_for(&self, row_key: &str) -> Arc<RemoteTablet> {
        let node = self.select(row_key);
        self.client(node)
    }

    /// One client per node, in node id order
    ///
    /// Table lifecycle calls go to every node.
    pub fn all_clients(&self) -> Vec<Arc<RemoteTablet>> {
        self.nodes.iter().map(|node| self.client(node)).collect()
    }

    pub fn nodes(&self) -> &[ServerNode] {
        &self.nodes
    }

    fn client(&self, node: &ServerNode) -> Arc<RemoteTablet> {
        let mut clients = self.clients.lock();
        Arc::clone(
            clients
                .entry(node.node_id)
                .or_insert_with(|| Arc::new(RemoteTablet::new(node.host_port.clone()))),
        )
    }
}
