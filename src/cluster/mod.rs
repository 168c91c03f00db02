//! Cluster Module
//!
//! Node membership and request routing.
//!
//! ## Responsibilities
//! - Master-side registration barrier: peers register until the expected
//!   node count is reached, then everyone receives the sorted member list
//! - Joining a cluster from a non-master node
//! - Hashing row keys onto the ring of node ids and picking a node
//!
//! The storage engine does not depend on any of this: requests reach it
//! already routed.

mod bootstrap;
mod hash;
mod membership;
mod router;

pub use bootstrap::join_cluster;
pub use hash::store_hash;
pub use membership::Membership;
pub use router::Router;
