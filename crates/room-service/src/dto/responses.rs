//! Response DTOs
//!
//! Serialized into outbound gateway frames. Ids are strings on the wire.

use chrono::{DateTime, Utc};
use room_core::{
    Message, MessageMetadata, MessageType, Participant, ParticipantRole, Permissions, Room,
    RoomType, Snowflake,
};
use serde::Serialize;

// ============================================================================
// Room Responses
// ============================================================================

/// Room settings as seen by clients; the password hash never leaves the server
#[derive(Debug, Clone, Serialize)]
pub struct RoomSettingsResponse {
    pub max_participants: u32,
    pub allow_file_uploads: bool,
    pub message_retention_days: u32,
    pub require_approval: bool,
    pub has_password: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub owner_id: Snowflake,
    pub settings: RoomSettingsResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            settings: RoomSettingsResponse {
                max_participants: room.settings.max_participants,
                allow_file_uploads: room.settings.allow_file_uploads,
                message_retention_days: room.settings.message_retention_days,
                require_approval: room.settings.require_approval,
                has_password: room.settings.has_password(),
            },
            name: room.name,
            description: room.description,
            room_type: room.room_type,
            owner_id: room.owner_id,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub room_id: Snowflake,
    pub user_id: Snowflake,
    pub role: ParticipantRole,
    pub permissions: Permissions,
    pub muted: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            permissions: participant.permissions(),
            room_id: participant.room_id,
            user_id: participant.user_id,
            role: participant.role,
            muted: participant.muted,
            joined_at: participant.joined_at,
        }
    }
}

// ============================================================================
// Message Responses
// ============================================================================

/// Reactions grouped by emoji, in order of first use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionResponse {
    pub emoji: String,
    pub count: usize,
    pub users: Vec<Snowflake>,
}

impl ReactionResponse {
    pub fn group(message: &Message) -> Vec<Self> {
        let mut groups: Vec<Self> = Vec::new();
        for reaction in &message.reactions {
            match groups.iter_mut().find(|g| g.emoji == reaction.emoji) {
                Some(group) => {
                    group.count += 1;
                    group.users.push(reaction.user_id);
                }
                None => groups.push(Self {
                    emoji: reaction.emoji.clone(),
                    count: 1,
                    users: vec![reaction.user_id],
                }),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub room_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<Snowflake>,
    pub reactions: Vec<ReactionResponse>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            reactions: ReactionResponse::group(&message),
            id: message.id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            content: message.content,
            message_type: message.message_type,
            metadata: message.metadata,
            reply_to_id: message.reply_to,
            created_at: message.created_at,
            edited_at: message.edited_at,
            deleted_at: message.deleted_at,
        }
    }
}

/// One page of history or search results, oldest first within the page
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub room_id: Snowflake,
    pub messages: Vec<MessageResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl HistoryResponse {
    /// Empty page, used when the store cannot be read
    pub fn empty(room_id: Snowflake, page: u32, page_size: u32) -> Self {
        Self {
            room_id,
            messages: Vec::new(),
            total: 0,
            page,
            page_size,
            has_more: false,
        }
    }
}
