//! Typing indicator handlers

use std::sync::Arc;

use room_core::DomainError;

use super::{announce, HandlerResult};
use crate::connection::Connection;
use crate::events::{GatewayEventType, RoomIdPayload, UserRoomEvent};
use crate::server::GatewayState;

/// Handles `typing-start` and `typing-stop`
pub struct TypingHandler;

impl TypingHandler {
    /// Arm (or re-arm) the user's typing indicator; only the first start
    /// is announced
    pub fn start(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomIdPayload,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        if !connection.is_in_room(room_id) {
            return Err(DomainError::NotParticipant(room_id).into());
        }

        let user_id = connection.user_id();
        if state
            .service_context()
            .presence()
            .start_typing(room_id, user_id)
        {
            announce(
                state,
                connection,
                room_id,
                GatewayEventType::UserTyping,
                &UserRoomEvent::new(user_id, room_id),
            );
        }
        Ok(())
    }

    /// Clear the indicator; the tracker's observer announces the stop
    pub fn stop(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomIdPayload,
    ) -> HandlerResult<()> {
        state
            .service_context()
            .presence()
            .stop_typing(payload.room_id, connection.user_id());
        Ok(())
    }
}
