//! Room and membership handlers

use std::sync::Arc;

use room_service::dto::CreateRoomRequest;
use room_service::{MessageRouter, RoomDirectory, ServiceResult};

use super::{announce, reply, Degraded, HandlerResult};
use crate::connection::Connection;
use crate::events::{
    GatewayEventType, JoinRoomPayload, ParticipantPayload, ParticipantsEvent, RoomIdPayload,
    RoomJoinedEvent, RoomListEvent, RoomRefEvent, SetMutedPayload, SetRolePayload,
    UpdateRoomPayload, UserRoomEvent,
};
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;

/// Handles room lifecycle and membership events
pub struct RoomHandler;

impl RoomHandler {
    /// `join-room`: admit the user, subscribe their connections, and send
    /// the room with its recent history
    pub async fn join(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: JoinRoomPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let ctx = state.service_context();
        let room_id = payload.room_id;
        let user_id = connection.user_id();

        let room = {
            let _order = state.sequencer().acquire(room_id).await;

            let (room, newly_joined) = RoomDirectory::new(ctx)
                .join_room(user_id, room_id, payload.password.as_deref())
                .await?;

            state.registry().subscribe_user(room_id, user_id);
            if newly_joined {
                announce(
                    state,
                    connection,
                    room_id,
                    GatewayEventType::UserJoined,
                    &UserRoomEvent::new(user_id, room_id),
                );
            }
            room
        };

        let (messages, outcome) = Degraded::from_result(
            MessageRouter::new(ctx)
                .recent(room_id, ctx.config().recent_history_limit)
                .await,
            Vec::new,
        )?
        .split();

        reply(
            connection,
            GatewayEventType::RoomJoined,
            &RoomJoinedEvent { room, messages },
            id,
        );
        outcome
    }

    /// `leave-room`
    pub async fn leave(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomIdPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let user_id = connection.user_id();

        let _order = state.sequencer().acquire(room_id).await;

        let left = RoomDirectory::new(state.service_context())
            .leave_room(user_id, room_id)
            .await?;

        state.registry().unsubscribe_user(room_id, user_id);
        if left {
            state.registry().broadcast(
                room_id,
                &GatewayMessage::event(
                    GatewayEventType::UserLeft,
                    &UserRoomEvent::new(user_id, room_id),
                ),
                None,
            );
        }

        reply(connection, GatewayEventType::RoomLeft, &RoomRefEvent { room_id }, id);
        Ok(())
    }

    /// `create-room`: every initial participant's live connections are
    /// subscribed to the new room
    pub async fn create(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: CreateRoomRequest,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let directory = RoomDirectory::new(state.service_context());
        let room = directory.create_room(connection.user_id(), request).await?;

        for participant in directory.get_participants(room.id).await? {
            state.registry().subscribe_user(room.id, participant.user_id);
        }

        announce(state, connection, room.id, GatewayEventType::RoomCreated, &room);
        reply(connection, GatewayEventType::RoomCreated, &room, id);
        Ok(())
    }

    /// `update-room`
    pub async fn update(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: UpdateRoomPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let _order = state.sequencer().acquire(room_id).await;

        let room = RoomDirectory::new(state.service_context())
            .update_room(room_id, connection.user_id(), payload.patch)
            .await?;

        announce(state, connection, room_id, GatewayEventType::RoomUpdated, &room);
        reply(connection, GatewayEventType::RoomUpdated, &room, id);
        Ok(())
    }

    /// `delete-room`: subscribers are told, then dropped from the room
    pub async fn delete(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomIdPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let _order = state.sequencer().acquire(room_id).await;

        RoomDirectory::new(state.service_context())
            .delete_room(room_id, connection.user_id())
            .await?;

        let event = RoomRefEvent { room_id };
        announce(state, connection, room_id, GatewayEventType::RoomDeleted, &event);
        reply(connection, GatewayEventType::RoomDeleted, &event, id);

        let dropped = state.registry().unsubscribe_all(room_id);
        tracing::info!(room_id = %room_id, dropped, "Room deleted");
        Ok(())
    }

    /// `list-rooms`
    pub async fn list(
        state: &GatewayState,
        connection: &Arc<Connection>,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let (rooms, outcome) = Degraded::from_result(
            RoomDirectory::new(state.service_context())
                .list_rooms_for_user(connection.user_id())
                .await,
            Vec::new,
        )?
        .split();

        reply(connection, GatewayEventType::RoomList, &RoomListEvent { rooms }, id);
        outcome
    }

    /// `get-participants` (members only)
    pub async fn participants(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomIdPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let directory = RoomDirectory::new(state.service_context());

        let result: ServiceResult<_> = async {
            directory
                .require_participant(room_id, connection.user_id())
                .await?;
            directory.get_participants(room_id).await
        }
        .await;
        let (participants, outcome) = Degraded::from_result(result, Vec::new)?.split();

        reply(
            connection,
            GatewayEventType::Participants,
            &ParticipantsEvent {
                room_id,
                participants,
            },
            id,
        );
        outcome
    }

    /// `add-participant`: the approval and invite path
    pub async fn add_participant(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ParticipantPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let ParticipantPayload { room_id, user_id } = payload;
        let _order = state.sequencer().acquire(room_id).await;

        let (participant, added) = RoomDirectory::new(state.service_context())
            .add_participant(room_id, connection.user_id(), user_id)
            .await?;

        if added {
            state.registry().subscribe_user(room_id, user_id);
            announce(
                state,
                connection,
                room_id,
                GatewayEventType::UserJoined,
                &UserRoomEvent::new(user_id, room_id),
            );
        }

        reply(connection, GatewayEventType::ParticipantUpdated, &participant, id);
        Ok(())
    }

    /// `remove-participant`: the removed user's connections get `room-left`
    pub async fn remove_participant(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ParticipantPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let ParticipantPayload { room_id, user_id } = payload;
        let _order = state.sequencer().acquire(room_id).await;

        RoomDirectory::new(state.service_context())
            .remove_participant(room_id, connection.user_id(), user_id)
            .await?;

        state.registry().send_to_user(
            user_id,
            &GatewayMessage::event(GatewayEventType::RoomLeft, &RoomRefEvent { room_id }),
        );
        state.registry().unsubscribe_user(room_id, user_id);

        let event = UserRoomEvent::new(user_id, room_id);
        announce(state, connection, room_id, GatewayEventType::UserLeft, &event);
        reply(connection, GatewayEventType::UserLeft, &event, id);
        Ok(())
    }

    /// `set-role`
    pub async fn set_role(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SetRolePayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let _order = state.sequencer().acquire(room_id).await;

        let participant = RoomDirectory::new(state.service_context())
            .set_role(
                room_id,
                connection.user_id(),
                payload.user_id,
                payload.request.role,
            )
            .await?;

        announce(
            state,
            connection,
            room_id,
            GatewayEventType::ParticipantUpdated,
            &participant,
        );
        reply(connection, GatewayEventType::ParticipantUpdated, &participant, id);
        Ok(())
    }

    /// `set-muted`
    pub async fn set_muted(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SetMutedPayload,
        id: Option<String>,
    ) -> HandlerResult<()> {
        let room_id = payload.room_id;
        let _order = state.sequencer().acquire(room_id).await;

        let participant = RoomDirectory::new(state.service_context())
            .set_muted(room_id, connection.user_id(), payload.user_id, payload.muted)
            .await?;

        announce(
            state,
            connection,
            room_id,
            GatewayEventType::ParticipantUpdated,
            &participant,
        );
        reply(connection, GatewayEventType::ParticipantUpdated, &participant, id);
        Ok(())
    }
}
