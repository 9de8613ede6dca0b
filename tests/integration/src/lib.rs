//! Integration test utilities for the room gateway
//!
//! This crate provides helpers for running end-to-end tests against a live
//! gateway over real WebSocket connections.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
