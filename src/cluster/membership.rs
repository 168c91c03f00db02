//! Cluster membership
//!
//! The master collects `RegisterServer` calls until `expected` distinct
//! nodes have registered; from then on every registrant and every
//! `GetServers` caller gets the full list sorted by node id.

use parking_lot::Mutex;

use crate::error::{Result, TabletError};
use crate::protocol::{ServerNode, Status};

struct MembershipState {
    expected: usize,
    nodes: Vec<ServerNode>,
}

/// Membership view of one node
pub struct Membership {
    is_master: bool,
    state: Mutex<MembershipState>,
}

impl Membership {
    /// A master waiting for `expected` nodes (itself included)
    pub fn master(expected: usize) -> Self {
        Self {
            is_master: true,
            state: Mutex::new(MembershipState {
                expected,
                nodes: Vec::with_capacity(expected),
            }),
        }
    }

    /// A non-master node; its member list arrives through [`install`](Self::install)
    pub fn member() -> Self {
        Self {
            is_master: false,
            state: Mutex::new(MembershipState {
                expected: 0,
                nodes: Vec::new(),
            }),
        }
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    /// Record a node (idempotent per node id)
    ///
    /// Returns `Ok` with the sorted member list once everyone has
    /// registered, `NotReady` with an empty list before that.
    pub fn register(&self, node: ServerNode) -> Result<(Status, Vec<ServerNode>)> {
        if !self.is_master {
            return Err(TabletError::Cluster(
                "cannot register server on a non-master node".to_string(),
            ));
        }

        let mut state = self.state.lock();
        let known = state.nodes.iter().any(|n| n.node_id == node.node_id);

        if !known {
            if state.nodes.len() >= state.expected {
                return Err(TabletError::Cluster(format!(
                    "cluster is full ({} nodes); rejecting {} (id {})",
                    state.expected, node.host_port, node.node_id
                )));
            }
            tracing::info!(
                "Registered node {} (id {}), {}/{}",
                node.host_port,
                node.node_id,
                state.nodes.len() + 1,
                state.expected
            );
            state.nodes.push(node);
            state.nodes.sort_by_key(|n| n.node_id);
        }

        Ok(Self::snapshot(&state))
    }

    /// Current member list, if the cluster is ready
    pub fn servers(&self) -> (Status, Vec<ServerNode>) {
        Self::snapshot(&self.state.lock())
    }

    /// Adopt the member list handed out by the master
    pub fn install(&self, mut nodes: Vec<ServerNode>) {
        nodes.sort_by_key(|n| n.node_id);
        let mut state = self.state.lock();
        state.expected = nodes.len();
        state.nodes = nodes;
    }

    pub fn is_ready(&self) -> bool {
        let state = self.state.lock();
        Self::ready(&state)
    }

    fn ready(state: &MembershipState) -> bool {
        !state.nodes.is_empty() && state.nodes.len() == state.expected
    }

    fn snapshot(state: &MembershipState) -> (Status, Vec<ServerNode>) {
        if Self::ready(state) {
            (Status::Ok, state.nodes.clone())
        } else {
            (Status::NotReady, Vec::new())
        }
    }
}
