//! Joining a cluster

use std::thread;
use std::time::Duration;

use crate::error::{Result, TabletError};
use crate::network::RemoteTablet;
use crate::protocol::{RegisterServerArgs, ServerNode};
use crate::service::TabletService;

/// Register `node` with the master at `master_addr` and wait for the
/// cluster to fill up
///
/// Retries every `retry` while the master is unreachable or still waiting
/// for peers. `max_attempts` of `None` retries forever.
pub fn join_cluster(
    master_addr: &str,
    node: &ServerNode,
    retry: Duration,
    max_attempts: Option<usize>,
) -> Result<Vec<ServerNode>> {
    let master = RemoteTablet::new(master_addr);
    let mut attempt = 0usize;

    loop {
        attempt += 1;

        let args = RegisterServerArgs {
            server_info: node.clone(),
        };
        match master.register_server(args) {
            Ok(reply) if reply.status.is_ok() => {
                tracing::info!(
                    "Joined cluster via {} with {} nodes",
                    master_addr,
                    reply.servers.len()
                );
                return Ok(reply.servers);
            }
            Ok(reply) => {
                tracing::debug!("Master {} replied {:?}; waiting", master_addr, reply.status);
            }
            // A full cluster will not change its mind
            Err(TabletError::Remote(message)) => {
                return Err(TabletError::Cluster(message));
            }
            Err(e) => {
                tracing::debug!("Registration with {} failed: {}", master_addr, e);
            }
        }

        if max_attempts.is_some_and(|max| attempt >= max) {
            return Err(TabletError::Cluster(format!(
                "cluster at {} not ready after {} attempts",
                master_addr, attempt
            )));
        }

        thread::sleep(retry);
    }
}
