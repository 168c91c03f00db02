//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One handler thread per connection, capped by `max_connections`
//! - Commands routed through any [`TabletService`](crate::service::TabletService)
//! - [`RemoteTablet`] speaks the same protocol from the client side

mod client;
mod connection;
mod server;

pub use client::RemoteTablet;
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};
