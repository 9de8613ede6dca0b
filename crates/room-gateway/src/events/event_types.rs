//! Gateway event types
//!
//! Every event name that appears in the `event` field of a frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatewayEventType {
    // Client -> server
    JoinRoom,
    LeaveRoom,
    SendMessage,
    EditMessage,
    DeleteMessage,
    AddReaction,
    TypingStart,
    TypingStop,
    CreateRoom,
    UpdateRoom,
    DeleteRoom,
    ListRooms,
    GetParticipants,
    FetchHistory,
    SearchMessages,
    AddParticipant,
    RemoveParticipant,
    SetRole,
    SetMuted,

    // Server -> client
    /// Sent once after the upgrade is authenticated
    Ready,
    RoomJoined,
    RoomLeft,
    RoomCreated,
    RoomUpdated,
    RoomDeleted,
    RoomList,
    Participants,
    ParticipantUpdated,
    History,
    SearchResults,
    NewMessage,
    MessageEdited,
    MessageDeleted,
    ReactionUpdated,
    UserJoined,
    UserLeft,
    UserOnline,
    UserOffline,
    UserTyping,
    UserStoppedTyping,
    /// Sent only to the connection whose request failed
    Error,
}

impl GatewayEventType {
    /// Get the wire name of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JoinRoom => "join-room",
            Self::LeaveRoom => "leave-room",
            Self::SendMessage => "send-message",
            Self::EditMessage => "edit-message",
            Self::DeleteMessage => "delete-message",
            Self::AddReaction => "add-reaction",
            Self::TypingStart => "typing-start",
            Self::TypingStop => "typing-stop",
            Self::CreateRoom => "create-room",
            Self::UpdateRoom => "update-room",
            Self::DeleteRoom => "delete-room",
            Self::ListRooms => "list-rooms",
            Self::GetParticipants => "get-participants",
            Self::FetchHistory => "fetch-history",
            Self::SearchMessages => "search-messages",
            Self::AddParticipant => "add-participant",
            Self::RemoveParticipant => "remove-participant",
            Self::SetRole => "set-role",
            Self::SetMuted => "set-muted",
            Self::Ready => "ready",
            Self::RoomJoined => "room-joined",
            Self::RoomLeft => "room-left",
            Self::RoomCreated => "room-created",
            Self::RoomUpdated => "room-updated",
            Self::RoomDeleted => "room-deleted",
            Self::RoomList => "room-list",
            Self::Participants => "participants",
            Self::ParticipantUpdated => "participant-updated",
            Self::History => "history",
            Self::SearchResults => "search-results",
            Self::NewMessage => "new-message",
            Self::MessageEdited => "message-edited",
            Self::MessageDeleted => "message-deleted",
            Self::ReactionUpdated => "reaction-updated",
            Self::UserJoined => "user-joined",
            Self::UserLeft => "user-left",
            Self::UserOnline => "user-online",
            Self::UserOffline => "user-offline",
            Self::UserTyping => "user-typing",
            Self::UserStoppedTyping => "user-stopped-typing",
            Self::Error => "error",
        }
    }

    /// Parse an event type from its wire name
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "join-room" => Some(Self::JoinRoom),
            "leave-room" => Some(Self::LeaveRoom),
            "send-message" => Some(Self::SendMessage),
            "edit-message" => Some(Self::EditMessage),
            "delete-message" => Some(Self::DeleteMessage),
            "add-reaction" => Some(Self::AddReaction),
            "typing-start" => Some(Self::TypingStart),
            "typing-stop" => Some(Self::TypingStop),
            "create-room" => Some(Self::CreateRoom),
            "update-room" => Some(Self::UpdateRoom),
            "delete-room" => Some(Self::DeleteRoom),
            "list-rooms" => Some(Self::ListRooms),
            "get-participants" => Some(Self::GetParticipants),
            "fetch-history" => Some(Self::FetchHistory),
            "search-messages" => Some(Self::SearchMessages),
            "add-participant" => Some(Self::AddParticipant),
            "remove-participant" => Some(Self::RemoveParticipant),
            "set-role" => Some(Self::SetRole),
            "set-muted" => Some(Self::SetMuted),
            "ready" => Some(Self::Ready),
            "room-joined" => Some(Self::RoomJoined),
            "room-left" => Some(Self::RoomLeft),
            "room-created" => Some(Self::RoomCreated),
            "room-updated" => Some(Self::RoomUpdated),
            "room-deleted" => Some(Self::RoomDeleted),
            "room-list" => Some(Self::RoomList),
            "participants" => Some(Self::Participants),
            "participant-updated" => Some(Self::ParticipantUpdated),
            "history" => Some(Self::History),
            "search-results" => Some(Self::SearchResults),
            "new-message" => Some(Self::NewMessage),
            "message-edited" => Some(Self::MessageEdited),
            "message-deleted" => Some(Self::MessageDeleted),
            "reaction-updated" => Some(Self::ReactionUpdated),
            "user-joined" => Some(Self::UserJoined),
            "user-left" => Some(Self::UserLeft),
            "user-online" => Some(Self::UserOnline),
            "user-offline" => Some(Self::UserOffline),
            "user-typing" => Some(Self::UserTyping),
            "user-stopped-typing" => Some(Self::UserStoppedTyping),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Events a client may send
    #[must_use]
    pub const fn is_client_event(self) -> bool {
        matches!(
            self,
            Self::JoinRoom
                | Self::LeaveRoom
                | Self::SendMessage
                | Self::EditMessage
                | Self::DeleteMessage
                | Self::AddReaction
                | Self::TypingStart
                | Self::TypingStop
                | Self::CreateRoom
                | Self::UpdateRoom
                | Self::DeleteRoom
                | Self::ListRooms
                | Self::GetParticipants
                | Self::FetchHistory
                | Self::SearchMessages
                | Self::AddParticipant
                | Self::RemoveParticipant
                | Self::SetRole
                | Self::SetMuted
        )
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<GatewayEventType> for String {
    fn from(event: GatewayEventType) -> Self {
        event.as_str().to_string()
    }
}
