//! Typing-expiry fan-out
//!
//! Every typing removal (explicit stop, send, leave, disconnect, room
//! deletion, or expiry) reaches subscribers as one `user-stopped-typing`.

use std::sync::Arc;

use room_core::Snowflake;
use room_service::TypingObserver;

use crate::connection::ConnectionRegistry;
use crate::events::{GatewayEventType, UserRoomEvent};
use crate::protocol::GatewayMessage;

/// Broadcasts `user-stopped-typing` to the whole room, including the typist
pub struct TypingBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl TypingBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

impl TypingObserver for TypingBroadcaster {
    fn typing_stopped(&self, room_id: Snowflake, user_id: Snowflake) {
        let event = GatewayMessage::event(
            GatewayEventType::UserStoppedTyping,
            &UserRoomEvent::new(user_id, room_id),
        );
        self.registry.broadcast(room_id, &event, None);
    }
}
