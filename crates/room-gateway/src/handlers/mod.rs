//! Event handlers
//!
//! Handles incoming WebSocket events based on their event name.

mod error;
mod lifecycle;
mod messages;
mod rooms;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use lifecycle::LifecycleHandler;
pub use messages::MessageHandler;
pub use rooms::RoomHandler;
pub use typing::TypingHandler;

use std::sync::Arc;

use room_service::{ServiceError, ServiceResult};
use serde::Serialize;

use crate::connection::Connection;
use crate::events::GatewayEventType;
use crate::protocol::{ClientEvent, GatewayMessage};
use crate::server::GatewayState;

/// Dispatch incoming client events to the appropriate handler
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle one inbound frame
    ///
    /// Failures never close the connection; they are answered with an
    /// `error` frame to the sender only.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) {
        let id = message.id.clone();
        if let Err(e) = Self::route(state, connection, message, id.clone()).await {
            tracing::debug!(
                session_id = %connection.session_id(),
                code = e.code(),
                error = %e,
                "Event rejected"
            );
            connection.send(e.to_frame(id));
        }
    }

    async fn route(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let event = ClientEvent::parse(message)?;

        tracing::trace!(
            session_id = %connection.session_id(),
            event = event.name(),
            "Dispatching event"
        );

        match event {
            ClientEvent::JoinRoom(p) => RoomHandler::join(state, connection, p, id).await,
            ClientEvent::LeaveRoom(p) => RoomHandler::leave(state, connection, p, id).await,
            ClientEvent::CreateRoom(r) => RoomHandler::create(state, connection, r, id).await,
            ClientEvent::UpdateRoom(p) => RoomHandler::update(state, connection, p, id).await,
            ClientEvent::DeleteRoom(p) => RoomHandler::delete(state, connection, p, id).await,
            ClientEvent::ListRooms => RoomHandler::list(state, connection, id).await,
            ClientEvent::GetParticipants(p) => {
                RoomHandler::participants(state, connection, p, id).await
            }
            ClientEvent::AddParticipant(p) => {
                RoomHandler::add_participant(state, connection, p, id).await
            }
            ClientEvent::RemoveParticipant(p) => {
                RoomHandler::remove_participant(state, connection, p, id).await
            }
            ClientEvent::SetRole(p) => RoomHandler::set_role(state, connection, p, id).await,
            ClientEvent::SetMuted(p) => RoomHandler::set_muted(state, connection, p, id).await,
            ClientEvent::SendMessage(p) => MessageHandler::send(state, connection, p, id).await,
            ClientEvent::EditMessage(p) => MessageHandler::edit(state, connection, p, id).await,
            ClientEvent::DeleteMessage(p) => MessageHandler::delete(state, connection, p, id).await,
            ClientEvent::AddReaction(p) => MessageHandler::react(state, connection, p, id).await,
            ClientEvent::FetchHistory(p) => MessageHandler::history(state, connection, p, id).await,
            ClientEvent::SearchMessages(p) => {
                MessageHandler::search(state, connection, p, id).await
            }
            ClientEvent::TypingStart(p) => TypingHandler::start(state, connection, p),
            ClientEvent::TypingStop(p) => TypingHandler::stop(state, connection, p),
        }
    }
}

/// Send `event` to the requesting connection, echoing its request id
fn reply<T: Serialize>(
    connection: &Connection,
    event_type: GatewayEventType,
    data: &T,
    id: Option<String>,
) {
    connection.send(GatewayMessage::reply(event_type, data, id));
}

/// Fan `event` out to a room, skipping the requesting connection
fn announce<T: Serialize>(
    state: &GatewayState,
    connection: &Connection,
    room_id: room_core::Snowflake,
    event_type: GatewayEventType,
    data: &T,
) -> usize {
    state.registry().broadcast(
        room_id,
        &GatewayMessage::event(event_type, data),
        Some(connection.session_id()),
    )
}

/// Outcome of a read that may have fallen back to an empty result
struct Degraded<T> {
    value: T,
    failure: Option<ServiceError>,
}

impl<T> Degraded<T> {
    /// An unavailable store yields `empty()`; other errors propagate
    fn from_result(result: ServiceResult<T>, empty: impl FnOnce() -> T) -> HandlerResult<Self> {
        match result {
            Ok(value) => Ok(Self {
                value,
                failure: None,
            }),
            Err(e) if e.is_unavailable() => {
                tracing::warn!(error = %e, "Store unavailable, replying with empty result");
                Ok(Self {
                    value: empty(),
                    failure: Some(e),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The value to reply with, and the error to report once the reply
    /// went out
    fn split(self) -> (T, HandlerResult<()>) {
        let outcome = self.failure.map_or(Ok(()), |e| Err(e.into()));
        (self.value, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{frame, Harness, ALICE};
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_event_answers_sender_only() {
        let h = Harness::new();
        let (alice, mut rx) = h.connect(ALICE).await;
        Harness::drain(&mut rx);

        MessageDispatcher::dispatch(&h.state, &alice, frame("fly", json!({}), Some("7"))).await;

        let frames = Harness::drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is(GatewayEventType::Error));
        assert_eq!(frames[0].data["code"], "UNKNOWN_EVENT");
        assert_eq!(frames[0].id.as_deref(), Some("7"));
        assert!(!alice.is_disconnected());
    }

    #[tokio::test]
    async fn test_invalid_payload_is_validation_failure() {
        let h = Harness::new();
        let (alice, mut rx) = h.connect(ALICE).await;
        Harness::drain(&mut rx);

        MessageDispatcher::dispatch(
            &h.state,
            &alice,
            frame("join-room", json!({"password": 1}), None),
        )
        .await;

        let frames = Harness::drain(&mut rx);
        assert_eq!(frames[0].data["kind"], "VALIDATION_FAILED");
        assert_eq!(frames[0].data["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_degraded_read_keeps_value_and_error() {
        let degraded = Degraded::from_result(
            Err(room_core::DomainError::StoreUnavailable("down".to_string()).into()),
            Vec::<u32>::new,
        )
        .unwrap();
        let (value, outcome) = degraded.split();
        assert!(value.is_empty());
        assert!(outcome.is_err());

        let other: HandlerResult<Degraded<Vec<u32>>> = Degraded::from_result(
            Err(room_core::DomainError::NotRoomOwner.into()),
            Vec::new,
        );
        assert!(other.is_err());
    }
}
