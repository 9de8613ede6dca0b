//! In-memory store
//!
//! One `MemoryStore` serves both store traits so room deletion can cascade
//! into messages.

mod messages;
mod rooms;
mod store;

pub use store::MemoryStore;
