//! Inbound event parsing
//!
//! A frame is decoded in two steps: the envelope first, then the payload
//! for the named event. Each step has its own error so clients can tell a
//! typo in the event name from a bad field.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use room_service::dto::CreateRoomRequest;

use super::GatewayMessage;
use crate::events::{
    EditMessagePayload, GatewayEventType, HistoryPayload, JoinRoomPayload, MessageIdPayload,
    ParticipantPayload, ReactionPayload, RoomIdPayload, SearchPayload, SendMessagePayload,
    SetMutedPayload, SetRolePayload, UpdateRoomPayload,
};

/// Frame-level failures; none of them close the connection
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid payload for {event}: {reason}")]
    InvalidPayload {
        event: &'static str,
        reason: String,
    },

    #[error("Binary frames are not supported")]
    BinaryFrame,
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedFrame(_) => "MALFORMED_FRAME",
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::InvalidPayload { .. } => "INVALID_PAYLOAD",
            Self::BinaryFrame => "BINARY_FRAME",
        }
    }
}

/// Every event a client may send, with its decoded payload
#[derive(Debug, Clone)]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    LeaveRoom(RoomIdPayload),
    SendMessage(SendMessagePayload),
    EditMessage(EditMessagePayload),
    DeleteMessage(MessageIdPayload),
    AddReaction(ReactionPayload),
    TypingStart(RoomIdPayload),
    TypingStop(RoomIdPayload),
    CreateRoom(CreateRoomRequest),
    UpdateRoom(UpdateRoomPayload),
    DeleteRoom(RoomIdPayload),
    ListRooms,
    GetParticipants(RoomIdPayload),
    FetchHistory(HistoryPayload),
    SearchMessages(SearchPayload),
    AddParticipant(ParticipantPayload),
    RemoveParticipant(ParticipantPayload),
    SetRole(SetRolePayload),
    SetMuted(SetMutedPayload),
}

impl ClientEvent {
    /// Decode the payload of an inbound frame
    pub fn parse(message: GatewayMessage) -> Result<Self, ProtocolError> {
        let event_type = GatewayEventType::from_str(&message.event)
            .filter(|e| e.is_client_event())
            .ok_or(ProtocolError::UnknownEvent(message.event))?;

        let data = message.data;
        let event = match event_type {
            GatewayEventType::JoinRoom => Self::JoinRoom(payload(event_type, data)?),
            GatewayEventType::LeaveRoom => Self::LeaveRoom(payload(event_type, data)?),
            GatewayEventType::SendMessage => Self::SendMessage(payload(event_type, data)?),
            GatewayEventType::EditMessage => Self::EditMessage(payload(event_type, data)?),
            GatewayEventType::DeleteMessage => Self::DeleteMessage(payload(event_type, data)?),
            GatewayEventType::AddReaction => Self::AddReaction(payload(event_type, data)?),
            GatewayEventType::TypingStart => Self::TypingStart(payload(event_type, data)?),
            GatewayEventType::TypingStop => Self::TypingStop(payload(event_type, data)?),
            GatewayEventType::CreateRoom => Self::CreateRoom(payload(event_type, data)?),
            GatewayEventType::UpdateRoom => Self::UpdateRoom(payload(event_type, data)?),
            GatewayEventType::DeleteRoom => Self::DeleteRoom(payload(event_type, data)?),
            GatewayEventType::ListRooms => Self::ListRooms,
            GatewayEventType::GetParticipants => Self::GetParticipants(payload(event_type, data)?),
            GatewayEventType::FetchHistory => Self::FetchHistory(payload(event_type, data)?),
            GatewayEventType::SearchMessages => Self::SearchMessages(payload(event_type, data)?),
            GatewayEventType::AddParticipant => Self::AddParticipant(payload(event_type, data)?),
            GatewayEventType::RemoveParticipant => {
                Self::RemoveParticipant(payload(event_type, data)?)
            }
            GatewayEventType::SetRole => Self::SetRole(payload(event_type, data)?),
            GatewayEventType::SetMuted => Self::SetMuted(payload(event_type, data)?),
            other => return Err(ProtocolError::UnknownEvent(other.as_str().to_string())),
        };

        Ok(event)
    }

    /// The event's wire name, for logging
    pub fn name(&self) -> &'static str {
        let event_type = match self {
            Self::JoinRoom(_) => GatewayEventType::JoinRoom,
            Self::LeaveRoom(_) => GatewayEventType::LeaveRoom,
            Self::SendMessage(_) => GatewayEventType::SendMessage,
            Self::EditMessage(_) => GatewayEventType::EditMessage,
            Self::DeleteMessage(_) => GatewayEventType::DeleteMessage,
            Self::AddReaction(_) => GatewayEventType::AddReaction,
            Self::TypingStart(_) => GatewayEventType::TypingStart,
            Self::TypingStop(_) => GatewayEventType::TypingStop,
            Self::CreateRoom(_) => GatewayEventType::CreateRoom,
            Self::UpdateRoom(_) => GatewayEventType::UpdateRoom,
            Self::DeleteRoom(_) => GatewayEventType::DeleteRoom,
            Self::ListRooms => GatewayEventType::ListRooms,
            Self::GetParticipants(_) => GatewayEventType::GetParticipants,
            Self::FetchHistory(_) => GatewayEventType::FetchHistory,
            Self::SearchMessages(_) => GatewayEventType::SearchMessages,
            Self::AddParticipant(_) => GatewayEventType::AddParticipant,
            Self::RemoveParticipant(_) => GatewayEventType::RemoveParticipant,
            Self::SetRole(_) => GatewayEventType::SetRole,
            Self::SetMuted(_) => GatewayEventType::SetMuted,
        };
        event_type.as_str()
    }
}

fn payload<T: DeserializeOwned>(event: GatewayEventType, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event: event.as_str(),
        reason: e.to_string(),
    })
}
