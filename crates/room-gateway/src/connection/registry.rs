//! Connection registry
//!
//! Tracks all live connections using DashMap for thread-safe access, indexed
//! by session, by user, and by subscribed room.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use room_core::traits::IdentityProvider;
use room_core::{DomainError, Snowflake};
use tokio::sync::mpsc;

use super::Connection;
use crate::protocol::GatewayMessage;

/// Registry of every live connection
///
/// A connection's room set and `room_connections` are always updated
/// together, so broadcast only reaches subscribed connections.
pub struct ConnectionRegistry {
    identity: Arc<dyn IdentityProvider>,

    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,

    /// Room ID to subscribed session IDs mapping
    room_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionRegistry {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            room_connections: DashMap::new(),
        }
    }

    /// Resolve the credential and register an authenticated connection
    ///
    /// # Errors
    /// `Unauthenticated` when the identity provider rejects the credential
    pub async fn register(
        &self,
        session_id: String,
        sender: mpsc::Sender<GatewayMessage>,
        credential: &str,
    ) -> Result<Arc<Connection>, DomainError> {
        let user_id = self.identity.resolve(credential).await?;

        let connection = Connection::new(session_id.clone(), user_id, sender);
        self.connections.insert(session_id.clone(), connection.clone());
        self.user_connections
            .entry(user_id)
            .or_default()
            .insert(session_id.clone());

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection registered");

        Ok(connection)
    }

    /// Remove a connection and all its subscriptions; later calls are no-ops
    pub fn unregister(&self, session_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(session_id)?;
        connection.close();

        let user_id = connection.user_id();
        self.user_connections
            .remove_if_mut(&user_id, |_, sessions| {
                sessions.remove(session_id);
                sessions.is_empty()
            });

        for room_id in connection.rooms() {
            self.detach(room_id, session_id);
        }

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection unregistered");

        Some(connection)
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    // ========================================================================
    // Room subscriptions
    // ========================================================================

    /// Subscribe a connection to a room's broadcasts
    pub fn join_room(&self, session_id: &str, room_id: Snowflake) -> bool {
        let Some(connection) = self.get(session_id) else {
            return false;
        };
        if connection.is_disconnected() {
            return false;
        }

        connection.subscribe(room_id);
        self.room_connections
            .entry(room_id)
            .or_default()
            .insert(session_id.to_string());

        // A concurrent unregister may have snapshotted the rooms before the
        // subscribe above landed
        if connection.is_disconnected() {
            connection.unsubscribe(room_id);
            self.detach(room_id, session_id);
            return false;
        }

        tracing::trace!(session_id = %session_id, room_id = %room_id, "Subscribed to room");
        true
    }

    /// Unsubscribe a connection from a room
    pub fn leave_room(&self, session_id: &str, room_id: Snowflake) -> bool {
        let Some(connection) = self.get(session_id) else {
            return false;
        };

        let was_subscribed = connection.unsubscribe(room_id);
        self.detach(room_id, session_id);

        tracing::trace!(session_id = %session_id, room_id = %room_id, "Unsubscribed from room");
        was_subscribed
    }

    /// Subscribe every connection of a user; returns how many were added
    pub fn subscribe_user(&self, room_id: Snowflake, user_id: Snowflake) -> usize {
        self.user_sessions(user_id)
            .iter()
            .filter(|session_id| self.join_room(session_id, room_id))
            .count()
    }

    /// Unsubscribe every connection of a user (left or kicked)
    pub fn unsubscribe_user(&self, room_id: Snowflake, user_id: Snowflake) -> usize {
        self.user_sessions(user_id)
            .iter()
            .filter(|session_id| self.leave_room(session_id, room_id))
            .count()
    }

    /// Unsubscribe every connection from a deleted room
    pub fn unsubscribe_all(&self, room_id: Snowflake) -> usize {
        let Some((_, sessions)) = self.room_connections.remove(&room_id) else {
            return 0;
        };

        for session_id in &sessions {
            if let Some(connection) = self.get(session_id) {
                connection.unsubscribe(room_id);
            }
        }

        tracing::debug!(room_id = %room_id, count = sessions.len(), "Room subscriptions dropped");
        sessions.len()
    }

    fn detach(&self, room_id: Snowflake, session_id: &str) {
        self.room_connections
            .remove_if_mut(&room_id, |_, sessions| {
                sessions.remove(session_id);
                sessions.is_empty()
            });
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Deliver to every connection subscribed to the room
    ///
    /// Never waits: a full or closed queue skips that connection only.
    pub fn broadcast(
        &self,
        room_id: Snowflake,
        message: &GatewayMessage,
        exclude_session: Option<&str>,
    ) -> usize {
        let sent = self
            .room_connections(room_id)
            .into_iter()
            .filter(|conn| Some(conn.session_id()) != exclude_session)
            .filter(|conn| conn.send(message.clone()))
            .count();

        tracing::trace!(room_id = %room_id, event = %message.event, sent, "Broadcast to room");

        sent
    }

    /// Deliver to a single connection
    pub fn send_to(&self, session_id: &str, message: GatewayMessage) -> bool {
        self.get(session_id).is_some_and(|conn| conn.send(message))
    }

    /// Deliver to every connection of a user
    pub fn send_to_user(&self, user_id: Snowflake, message: &GatewayMessage) -> usize {
        self.user_connections(user_id)
            .into_iter()
            .filter(|conn| conn.send(message.clone()))
            .count()
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    fn user_sessions(&self, user_id: Snowflake) -> Vec<String> {
        self.user_connections
            .get(&user_id)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All connections of a user
    pub fn user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_sessions(user_id)
            .iter()
            .filter_map(|sid| self.get(sid))
            .collect()
    }

    /// All connections subscribed to a room
    pub fn room_connections(&self, room_id: Snowflake) -> Vec<Arc<Connection>> {
        let sessions: Vec<String> = self
            .room_connections
            .get(&room_id)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default();

        sessions.iter().filter_map(|sid| self.get(sid)).collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct users with at least one connection
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Number of rooms with at least one subscriber
    pub fn room_count(&self) -> usize {
        self.room_connections.len()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("rooms", &self.room_connections.len())
            .finish()
    }
}
