//! Shared state behind [`MemoryStore`]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use room_core::entities::{Message, Participant, Room};
use room_core::error::DomainError;
use room_core::traits::RepoResult;
use room_core::value_objects::Snowflake;
use tracing::warn;

pub(super) struct StoreInner {
    pub(super) rooms: DashMap<Snowflake, Room>,
    /// room_id -> participants in join order
    pub(super) participants: DashMap<Snowflake, Vec<Participant>>,
    pub(super) messages: DashMap<Snowflake, Message>,
    /// room_id -> message ids (Snowflake order is creation order)
    pub(super) room_messages: DashMap<Snowflake, BTreeSet<Snowflake>>,
    available: AtomicBool,
}

/// Process-local implementation of `RoomStore` and `MessageStore`
#[derive(Clone)]
pub struct MemoryStore {
    pub(super) inner: Arc<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                rooms: DashMap::new(),
                participants: DashMap::new(),
                messages: DashMap::new(),
                room_messages: DashMap::new(),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Toggle availability; while offline every operation fails with
    /// `StoreUnavailable` and no state changes.
    pub fn set_available(&self, available: bool) {
        let was = self.inner.available.swap(available, Ordering::SeqCst);
        if was != available {
            warn!(available, "Memory store availability changed");
        }
    }

    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::SeqCst)
    }

    /// Total stored messages, soft-deleted included
    pub fn message_count(&self) -> usize {
        self.inner.messages.len()
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    pub(super) fn ensure_available(&self) -> RepoResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(DomainError::StoreUnavailable(
                "memory store is offline".to_string(),
            ))
        }
    }

    pub(super) fn ensure_room(&self, room_id: Snowflake) -> RepoResult<()> {
        if self.inner.rooms.contains_key(&room_id) {
            Ok(())
        } else {
            Err(DomainError::RoomNotFound(room_id))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("rooms", &self.inner.rooms.len())
            .field("messages", &self.inner.messages.len())
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}
