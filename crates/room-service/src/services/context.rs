//! Service context - dependency container for services
//!
//! Holds the store collaborators, the id generator, the presence tracker,
//! and the per-room locks that serialize membership changes.

use std::sync::Arc;

use dashmap::DashMap;
use room_common::RoomsConfig;
use room_core::traits::{AttachmentService, MessageStore, RoomStore};
use room_core::{Snowflake, SnowflakeGenerator};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::{ServiceError, ServiceResult};
use super::presence::PresenceTracker;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    room_store: Arc<dyn RoomStore>,
    message_store: Arc<dyn MessageStore>,
    attachments: Arc<dyn AttachmentService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    presence: Arc<PresenceTracker>,
    config: RoomsConfig,
    room_locks: Arc<RoomLocks>,
}

impl ServiceContext {
    pub fn new(
        room_store: Arc<dyn RoomStore>,
        message_store: Arc<dyn MessageStore>,
        attachments: Arc<dyn AttachmentService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        presence: Arc<PresenceTracker>,
        config: RoomsConfig,
    ) -> Self {
        Self {
            room_store,
            message_store,
            attachments,
            snowflake_generator,
            presence,
            config,
            room_locks: Arc::new(DashMap::new()),
        }
    }

    // === Stores ===

    pub fn room_store(&self) -> &dyn RoomStore {
        self.room_store.as_ref()
    }

    pub fn message_store(&self) -> &dyn MessageStore {
        self.message_store.as_ref()
    }

    pub fn attachments(&self) -> &dyn AttachmentService {
        self.attachments.as_ref()
    }

    // === Runtime state ===

    pub fn presence(&self) -> &Arc<PresenceTracker> {
        &self.presence
    }

    pub fn config(&self) -> &RoomsConfig {
        &self.config
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Hold the room's membership lock until the guard drops
    pub async fn lock_room(&self, room_id: Snowflake) -> RoomGuard<'_> {
        let lock = self.room_locks.entry(room_id).or_default().clone();
        RoomGuard {
            locks: &*self.room_locks,
            room_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Rooms whose lock is currently held or awaited
    pub fn locked_rooms(&self) -> usize {
        self.room_locks.len()
    }
}

type RoomLocks = DashMap<Snowflake, Arc<Mutex<()>>>;

/// Exclusive hold on one room's membership writes
///
/// The room's entry is dropped with its last holder, so ids that never
/// name a room leave nothing behind.
pub struct RoomGuard<'a> {
    locks: &'a RoomLocks,
    room_id: Snowflake,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RoomGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.room_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("stores", &"...")
            .field("presence", &self.presence)
            .field("config", &self.config)
            .field("room_locks", &self.room_locks.len())
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    room_store: Option<Arc<dyn RoomStore>>,
    message_store: Option<Arc<dyn MessageStore>>,
    attachments: Option<Arc<dyn AttachmentService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    presence: Option<Arc<PresenceTracker>>,
    config: Option<RoomsConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_store(mut self, store: Arc<dyn RoomStore>) -> Self {
        self.room_store = Some(store);
        self
    }

    pub fn message_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.message_store = Some(store);
        self
    }

    pub fn attachments(mut self, service: Arc<dyn AttachmentService>) -> Self {
        self.attachments = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn presence(mut self, presence: Arc<PresenceTracker>) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn config(mut self, config: RoomsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// The generator defaults to worker 0 and the config to `RoomsConfig::default()`.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.room_store
                .ok_or_else(|| ServiceError::validation("room_store is required"))?,
            self.message_store
                .ok_or_else(|| ServiceError::validation("message_store is required"))?,
            self.attachments
                .ok_or_else(|| ServiceError::validation("attachments is required"))?,
            self.snowflake_generator.unwrap_or_default(),
            self.presence
                .ok_or_else(|| ServiceError::validation("presence is required"))?,
            self.config.unwrap_or_default(),
        ))
    }
}
