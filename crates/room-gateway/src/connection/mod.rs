//! Connection management
//!
//! Live WebSocket connections and the registry that routes frames to them.

mod connection;
mod registry;

pub use connection::{Connection, ConnectionState};
pub use registry::ConnectionRegistry;
