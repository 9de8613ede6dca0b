//! Event payload definitions
//!
//! Inbound payloads wrap the service request DTOs with the ids that address
//! them; outbound payloads are what subscribers receive.

use room_core::Snowflake;
use room_service::dto::{
    EditMessageRequest, HistoryQuery, MessageResponse, ParticipantResponse, ReactionRequest,
    ReactionResponse, RoomResponse, SearchQuery, SendMessageRequest, SetRoleRequest,
    UpdateRoomRequest,
};
use serde::{Deserialize, Serialize};

// === Inbound ===

/// Payload of events addressed to a single room
#[derive(Debug, Clone, Deserialize)]
pub struct RoomIdPayload {
    pub room_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomPayload {
    pub room_id: Snowflake,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessagePayload {
    pub room_id: Snowflake,
    #[serde(flatten)]
    pub message: SendMessageRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditMessagePayload {
    pub message_id: Snowflake,
    #[serde(flatten)]
    pub edit: EditMessageRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageIdPayload {
    pub message_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionPayload {
    pub message_id: Snowflake,
    #[serde(flatten)]
    pub reaction: ReactionRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoomPayload {
    pub room_id: Snowflake,
    #[serde(flatten)]
    pub patch: UpdateRoomRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPayload {
    pub room_id: Snowflake,
    #[serde(flatten)]
    pub query: HistoryQuery,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPayload {
    pub room_id: Snowflake,
    #[serde(flatten)]
    pub query: SearchQuery,
}

/// Payload of add-participant and remove-participant
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantPayload {
    pub room_id: Snowflake,
    pub user_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetRolePayload {
    pub room_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(flatten)]
    pub request: SetRoleRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetMutedPayload {
    pub room_id: Snowflake,
    pub user_id: Snowflake,
    pub muted: bool,
}

// === Outbound ===

/// `ready` payload
#[derive(Debug, Clone, Serialize)]
pub struct ReadyEvent {
    pub session_id: String,
    pub user_id: Snowflake,
    /// Rooms the connection was subscribed to on connect
    pub rooms: Vec<Snowflake>,
}

/// `room-joined` payload: the room plus its recent history, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct RoomJoinedEvent {
    pub room: RoomResponse,
    pub messages: Vec<MessageResponse>,
}

/// Payload of `room-left` and `room-deleted`
#[derive(Debug, Clone, Serialize)]
pub struct RoomRefEvent {
    pub room_id: Snowflake,
}

/// Payload of the user-scoped room events (joined, left, online, offline,
/// typing, stopped typing)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserRoomEvent {
    pub user_id: Snowflake,
    pub room_id: Snowflake,
}

impl UserRoomEvent {
    pub fn new(user_id: Snowflake, room_id: Snowflake) -> Self {
        Self { user_id, room_id }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionUpdatedEvent {
    pub room_id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub added: bool,
    pub reactions: Vec<ReactionResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomListEvent {
    pub rooms: Vec<RoomResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantsEvent {
    pub room_id: Snowflake,
    pub participants: Vec<ParticipantResponse>,
}
