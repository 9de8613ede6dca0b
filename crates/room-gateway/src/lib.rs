//! # room-gateway
//!
//! WebSocket gateway: accepts authenticated connections, dispatches room,
//! message, and typing events, and fans results out to room subscribers.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;

#[cfg(test)]
mod testing;

pub use server::{
    create_app, create_gateway_state, create_gateway_state_with_store, create_router, run,
    run_server, GatewayState,
};
