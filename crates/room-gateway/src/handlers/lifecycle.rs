//! Connection lifecycle handling
//!
//! Runs once when a connection authenticates and once when it goes away.

use std::sync::Arc;

use room_service::RoomDirectory;
use tracing::{debug, info, warn};

use super::HandlerError;
use crate::connection::Connection;
use crate::events::{GatewayEventType, ReadyEvent, UserRoomEvent};
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;

/// Handles the authenticated and disconnected transitions
pub struct LifecycleHandler;

impl LifecycleHandler {
    /// Auto-join the user's rooms, send `ready`, and announce `user-online`
    /// if this is the user's first connection
    pub async fn on_authenticated(state: &GatewayState, connection: &Arc<Connection>) {
        let ctx = state.service_context();
        let user_id = connection.user_id();
        let session_id = connection.session_id();

        let rooms = match RoomDirectory::new(ctx).list_rooms_for_user(user_id).await {
            Ok(rooms) => rooms,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Could not load rooms on connect");
                connection.send(HandlerError::from(e).to_frame(None));
                Vec::new()
            }
        };

        // Membership is confirmed again under each room's turn so a removal
        // or delete that lands after the listing is not undone
        let mut room_ids = Vec::with_capacity(rooms.len());
        for room in rooms {
            let _order = state.sequencer().acquire(room.id).await;
            match RoomDirectory::new(ctx).require_participant(room.id, user_id).await {
                Ok(_) => {
                    if state.registry().join_room(session_id, room.id) {
                        room_ids.push(room.id);
                    }
                }
                Err(e) if e.is_unavailable() => {
                    warn!(session_id = %session_id, room_id = %room.id, error = %e, "Could not confirm membership on connect");
                }
                Err(e) => {
                    debug!(session_id = %session_id, room_id = %room.id, error = %e, "Skipping room left since listing");
                }
            }
        }

        connection.send(GatewayMessage::event(
            GatewayEventType::Ready,
            &ReadyEvent {
                session_id: session_id.to_string(),
                user_id,
                rooms: room_ids.clone(),
            },
        ));

        if ctx.presence().set_online(user_id, true) {
            for room_id in room_ids {
                state.registry().broadcast(
                    room_id,
                    &GatewayMessage::event(
                        GatewayEventType::UserOnline,
                        &UserRoomEvent::new(user_id, room_id),
                    ),
                    Some(session_id),
                );
            }
        }

        info!(
            session_id = %session_id,
            user_id = %user_id,
            rooms = connection.rooms().len(),
            "Connection ready"
        );
    }

    /// Tear down a connection: clear typing, announce `user-offline` if it
    /// was the user's last connection, and unregister
    ///
    /// Safe to call more than once.
    pub fn on_disconnected(state: &GatewayState, connection: &Arc<Connection>) {
        let session_id = connection.session_id();
        let user_id = connection.user_id();
        let rooms = connection.rooms();

        if state.registry().unregister(session_id).is_none() {
            return;
        }

        let presence = state.service_context().presence();
        presence.clear_user(user_id);

        if presence.set_online(user_id, false) {
            for room_id in &rooms {
                state.registry().broadcast(
                    *room_id,
                    &GatewayMessage::event(
                        GatewayEventType::UserOffline,
                        &UserRoomEvent::new(user_id, *room_id),
                    ),
                    None,
                );
            }
        }

        info!(
            session_id = %session_id,
            user_id = %user_id,
            age_ms = connection.age().as_millis(),
            "Connection closed"
        );
    }
}
