//! Presence and typing tracker
//!
//! Ephemeral, process-local state: who is online (a per-user connection
//! count) and who is typing where. Typing entries expire on their own after
//! the configured timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use room_core::Snowflake;
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

/// Receives every typing removal exactly once
pub trait TypingObserver: Send + Sync {
    fn typing_stopped(&self, room_id: Snowflake, user_id: Snowflake);
}

/// Online status of a user across all their connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPresence {
    pub online: bool,
    pub connections: u32,
    pub last_seen: Option<DateTime<Utc>>,
}

struct TypingEntry {
    generation: u64,
    started_at: DateTime<Utc>,
    expiry: AbortHandle,
}

type TypingKey = (Snowflake, Snowflake);

/// Tracks online users and typing indicators
pub struct PresenceTracker {
    online: DashMap<Snowflake, UserPresence>,
    /// (room_id, user_id) -> pending expiry
    typing: DashMap<TypingKey, TypingEntry>,
    generation: AtomicU64,
    typing_timeout: Duration,
    observer: Arc<dyn TypingObserver>,
}

impl PresenceTracker {
    pub fn new(typing_timeout: Duration, observer: Arc<dyn TypingObserver>) -> Self {
        Self {
            online: DashMap::new(),
            typing: DashMap::new(),
            generation: AtomicU64::new(0),
            typing_timeout,
            observer,
        }
    }

    pub fn typing_timeout(&self) -> Duration {
        self.typing_timeout
    }

    // ========================================================================
    // Online status
    // ========================================================================

    /// Count a connection in or out; returns true on 0->1 or 1->0
    pub fn set_online(&self, user_id: Snowflake, online: bool) -> bool {
        let mut presence = self.online.entry(user_id).or_default();

        let transitioned = if online {
            presence.connections += 1;
            presence.connections == 1
        } else if presence.connections == 0 {
            false
        } else {
            presence.connections -= 1;
            presence.connections == 0
        };

        if transitioned {
            presence.online = online;
            presence.last_seen = Some(Utc::now());
            debug!(user_id = %user_id, online, "Presence changed");
        }
        transitioned
    }

    pub fn is_online(&self, user_id: Snowflake) -> bool {
        self.online.get(&user_id).is_some_and(|p| p.online)
    }

    pub fn presence(&self, user_id: Snowflake) -> UserPresence {
        self.online
            .get(&user_id)
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    // ========================================================================
    // Typing
    // ========================================================================

    /// Start or refresh a typing indicator; returns true if it was not active
    ///
    /// Refreshing replaces the pending expiry instead of adding another one.
    pub fn start_typing(self: &Arc<Self>, room_id: Snowflake, user_id: Snowflake) -> bool {
        let key = (room_id, user_id);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        let tracker = Arc::downgrade(self);
        let timeout = self.typing_timeout;
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(tracker) = tracker.upgrade() {
                if tracker.remove(key, Some(generation)) {
                    trace!(room_id = %room_id, user_id = %user_id, "Typing expired");
                }
            }
        });

        let previous = self.typing.insert(
            key,
            TypingEntry {
                generation,
                started_at: Utc::now(),
                expiry: task.abort_handle(),
            },
        );

        match previous {
            Some(old) => {
                old.expiry.abort();
                false
            }
            None => true,
        }
    }

    /// Returns true if the user was typing
    pub fn stop_typing(&self, room_id: Snowflake, user_id: Snowflake) -> bool {
        self.remove((room_id, user_id), None)
    }

    pub fn is_typing(&self, room_id: Snowflake, user_id: Snowflake) -> bool {
        self.typing.contains_key(&(room_id, user_id))
    }

    /// When the current typing indicator started
    pub fn typing_since(&self, room_id: Snowflake, user_id: Snowflake) -> Option<DateTime<Utc>> {
        self.typing.get(&(room_id, user_id)).map(|e| e.started_at)
    }

    /// Users currently typing in a room
    pub fn typing_in(&self, room_id: Snowflake) -> Vec<Snowflake> {
        let mut users: Vec<Snowflake> = self
            .typing
            .iter()
            .filter(|entry| entry.key().0 == room_id)
            .map(|entry| entry.key().1)
            .collect();
        users.sort_unstable();
        users
    }

    /// Stop every indicator of a user; returns the affected rooms
    pub fn clear_user(&self, user_id: Snowflake) -> Vec<Snowflake> {
        self.clear_matching(|&(_, user)| user == user_id)
            .into_iter()
            .map(|(room, _)| room)
            .collect()
    }

    /// Stop every indicator in a room; returns the affected users
    pub fn clear_room(&self, room_id: Snowflake) -> Vec<Snowflake> {
        self.clear_matching(|&(room, _)| room == room_id)
            .into_iter()
            .map(|(_, user)| user)
            .collect()
    }

    fn clear_matching(&self, predicate: impl Fn(&TypingKey) -> bool) -> Vec<TypingKey> {
        let keys: Vec<TypingKey> = self
            .typing
            .iter()
            .map(|entry| *entry.key())
            .filter(|key| predicate(key))
            .collect();

        keys.into_iter()
            .filter(|&key| self.remove(key, None))
            .collect()
    }

    /// The only removal path; notifies the observer once per removed entry
    ///
    /// With `generation`, only that exact entry is removed (expiry of a
    /// refreshed indicator is a no-op).
    fn remove(&self, key: TypingKey, generation: Option<u64>) -> bool {
        let removed = match generation {
            Some(generation) => self
                .typing
                .remove_if(&key, |_, entry| entry.generation == generation),
            None => self.typing.remove(&key),
        };

        match removed {
            Some((_, entry)) => {
                entry.expiry.abort();
                self.observer.typing_stopped(key.0, key.1);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("online", &self.online.len())
            .field("typing", &self.typing.len())
            .field("typing_timeout", &self.typing_timeout)
            .finish_non_exhaustive()
    }
}
