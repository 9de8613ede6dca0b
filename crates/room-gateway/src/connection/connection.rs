//! Individual WebSocket connection
//!
//! A connection is bound to one authenticated user for its whole life and
//! tracks the rooms it is subscribed to.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use room_core::Snowflake;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::protocol::GatewayMessage;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Upgrade accepted, credential not yet resolved
    Connecting,
    /// Identity known, no room subscriptions
    Authenticated,
    /// Subscribed to at least one room
    Joined,
    /// Terminal
    Disconnected,
}

/// A single WebSocket connection
pub struct Connection {
    session_id: String,
    user_id: Snowflake,
    state: RwLock<ConnectionState>,
    /// Rooms this connection receives broadcasts for
    rooms: RwLock<HashSet<Snowflake>>,
    /// Bounded outbound queue drained by the socket's send task
    sender: mpsc::Sender<GatewayMessage>,
    created_at: Instant,
}

impl Connection {
    pub fn new(
        session_id: String,
        user_id: Snowflake,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id,
            state: RwLock::new(ConnectionState::Authenticated),
            rooms: RwLock::new(HashSet::new()),
            sender,
            created_at: Instant::now(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Mark the connection closed; no further transitions happen afterwards
    pub fn close(&self) {
        *self.state.write() = ConnectionState::Disconnected;
    }

    pub fn is_disconnected(&self) -> bool {
        self.state() == ConnectionState::Disconnected
    }

    /// Add a room subscription; returns true if it was new
    pub(crate) fn subscribe(&self, room_id: Snowflake) -> bool {
        let added = self.rooms.write().insert(room_id);
        self.refresh_state();
        added
    }

    /// Drop a room subscription; returns true if it existed
    pub(crate) fn unsubscribe(&self, room_id: Snowflake) -> bool {
        let removed = self.rooms.write().remove(&room_id);
        self.refresh_state();
        removed
    }

    fn refresh_state(&self) {
        let joined = !self.rooms.read().is_empty();
        let mut state = self.state.write();
        if *state != ConnectionState::Disconnected {
            *state = if joined {
                ConnectionState::Joined
            } else {
                ConnectionState::Authenticated
            };
        }
    }

    pub fn rooms(&self) -> Vec<Snowflake> {
        let mut rooms: Vec<Snowflake> = self.rooms.read().iter().copied().collect();
        rooms.sort_unstable();
        rooms
    }

    pub fn is_in_room(&self, room_id: Snowflake) -> bool {
        self.rooms.read().contains(&room_id)
    }

    /// Enqueue a frame without waiting; full or closed queues drop it
    pub fn send(&self, message: GatewayMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    event = %message.event,
                    "Outbound queue full, dropping frame"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(session_id = %self.session_id, "Outbound queue closed");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("state", &self.state())
            .field("rooms", &self.rooms.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GatewayEventType;

    fn frame() -> GatewayMessage {
        GatewayMessage::event(GatewayEventType::UserOnline, &serde_json::json!({}))
    }

    #[test]
    fn test_connection_creation() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new("session123".to_string(), Snowflake::new(7), tx);

        assert_eq!(conn.session_id(), "session123");
        assert_eq!(conn.user_id(), Snowflake::new(7));
        assert_eq!(conn.state(), ConnectionState::Authenticated);
        assert!(conn.rooms().is_empty());
    }

    #[test]
    fn test_state_follows_subscriptions() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new("s".to_string(), Snowflake::new(7), tx);
        let room = Snowflake::new(1);

        assert!(conn.subscribe(room));
        assert!(!conn.subscribe(room));
        assert_eq!(conn.state(), ConnectionState::Joined);
        assert!(conn.is_in_room(room));

        assert!(conn.unsubscribe(room));
        assert_eq!(conn.state(), ConnectionState::Authenticated);

        conn.subscribe(room);
        conn.close();
        conn.unsubscribe(room);
        assert!(conn.is_disconnected());
    }

    #[test]
    fn test_send_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let conn = Connection::new("s".to_string(), Snowflake::new(7), tx);

        assert!(conn.send(frame()));
        assert!(!conn.send(frame()));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let conn = Connection::new("s".to_string(), Snowflake::new(7), tx);
        drop(rx);

        assert!(conn.is_closed());
        assert!(!conn.send(frame()));
    }
}
