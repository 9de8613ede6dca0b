//! # room-store
//!
//! Storage layer implementing the room-core store and attachment traits.
//!
//! ## Overview
//!
//! - [`MemoryStore`]: a process-local `RoomStore` + `MessageStore` backed by
//!   `DashMap`s, with an availability switch for exercising outage paths
//! - [`AttachmentPolicy`]: extension, mime type, and size checks for file
//!   references on non-text messages
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use room_store::{AttachmentPolicy, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let attachments = Arc::new(AttachmentPolicy::new(10 * 1024 * 1024));
//! ```

pub mod attachments;
pub mod memory;

pub use attachments::AttachmentPolicy;
pub use memory::MemoryStore;
