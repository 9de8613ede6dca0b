//! Message handlers

use std::sync::Arc;

use room_service::dto::HistoryResponse;
use room_service::{MessageRouter, RoomDirectory, ServiceResult};

use super::{announce, reply, Degraded, HandlerResult};
use crate::connection::Connection;
use crate::events::{
    EditMessagePayload, GatewayEventType, HistoryPayload, MessageIdPayload, ReactionPayload,
    ReactionUpdatedEvent, SearchPayload, SendMessagePayload,
};
use crate::server::GatewayState;

/// Handles message events
///
/// Every accepted mutation is persisted and fanned out while the room's
/// sequencer guard is held.
pub struct MessageHandler;

impl MessageHandler {
    /// `send-message`
    pub async fn send(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SendMessagePayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let _order = state.sequencer().acquire(room_id).await;

        let message = MessageRouter::new(state.service_context())
            .send(room_id, connection.user_id(), payload.message)
            .await?;

        announce(state, connection, room_id, GatewayEventType::NewMessage, &message);
        reply(connection, GatewayEventType::NewMessage, &message, id);
        Ok(())
    }

    /// `edit-message`
    pub async fn edit(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: EditMessagePayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let router = MessageRouter::new(state.service_context());
        let room_id = router.room_of(payload.message_id).await?;
        let _order = state.sequencer().acquire(room_id).await;

        let message = router
            .edit(payload.message_id, connection.user_id(), payload.edit)
            .await?;

        announce(state, connection, room_id, GatewayEventType::MessageEdited, &message);
        reply(connection, GatewayEventType::MessageEdited, &message, id);
        Ok(())
    }

    /// `delete-message`
    pub async fn delete(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: MessageIdPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let router = MessageRouter::new(state.service_context());
        let room_id = router.room_of(payload.message_id).await?;
        let _order = state.sequencer().acquire(room_id).await;

        let message = router
            .delete(payload.message_id, connection.user_id())
            .await?;

        announce(state, connection, room_id, GatewayEventType::MessageDeleted, &message);
        reply(connection, GatewayEventType::MessageDeleted, &message, id);
        Ok(())
    }

    /// `add-reaction`: toggles, so a second identical request removes it
    pub async fn react(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ReactionPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let router = MessageRouter::new(state.service_context());
        let room_id = router.room_of(payload.message_id).await?;
        let _order = state.sequencer().acquire(room_id).await;

        let emoji = payload.reaction.emoji.clone();
        let toggle = router
            .toggle_reaction(payload.message_id, connection.user_id(), payload.reaction)
            .await?;

        let event = ReactionUpdatedEvent {
            room_id,
            message_id: payload.message_id,
            user_id: connection.user_id(),
            emoji,
            added: toggle.added,
            reactions: toggle.message.reactions,
        };
        announce(state, connection, room_id, GatewayEventType::ReactionUpdated, &event);
        reply(connection, GatewayEventType::ReactionUpdated, &event, id);
        Ok(())
    }

    /// `fetch-history` (members only)
    pub async fn history(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: HistoryPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let ctx = state.service_context();
        let HistoryPayload { room_id, query } = payload;
        let (page, page_size) = (query.page, query.page_size);

        let result: ServiceResult<_> = async {
            RoomDirectory::new(ctx)
                .require_participant(room_id, connection.user_id())
                .await?;
            MessageRouter::new(ctx).history(room_id, query).await
        }
        .await;
        let (history, outcome) =
            Degraded::from_result(result, || HistoryResponse::empty(room_id, page, page_size))?
                .split();

        reply(connection, GatewayEventType::History, &history, id);
        outcome
    }

    /// `search-messages` (members only)
    pub async fn search(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SearchPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let ctx = state.service_context();
        let SearchPayload { room_id, query } = payload;
        let (page, page_size) = (query.page, query.page_size);

        let result: ServiceResult<_> = async {
            RoomDirectory::new(ctx)
                .require_participant(room_id, connection.user_id())
                .await?;
            MessageRouter::new(ctx).search(room_id, query).await
        }
        .await;
        let (results, outcome) =
            Degraded::from_result(result, || HistoryResponse::empty(room_id, page, page_size))?
                .split();

        reply(connection, GatewayEventType::SearchResults, &results, id);
        outcome
    }
}
