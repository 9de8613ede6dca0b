//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate`; range checks that
//! depend on runtime configuration (message length) live in the services.

use room_core::{MessageMetadata, MessageType, ParticipantRole, RoomType, Snowflake};
use serde::Deserialize;
use validator::Validate;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

// ============================================================================
// Room Requests
// ============================================================================

/// Create room request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Room name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub room_type: RoomType,

    #[validate(range(min = 2, max = 1000, message = "Max participants must be 2-1000"))]
    pub max_participants: Option<u32>,

    pub allow_file_uploads: Option<bool>,

    #[validate(range(min = 1, max = 365, message = "Retention must be 1-365 days"))]
    pub message_retention_days: Option<u32>,

    #[serde(default)]
    pub require_approval: bool,

    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: Option<String>,

    /// Users added as members at creation
    #[serde(default)]
    pub participants: Vec<Snowflake>,
}

impl CreateRoomRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            room_type: RoomType::Public,
            max_participants: None,
            allow_file_uploads: None,
            message_retention_days: None,
            require_approval: false,
            password: None,
            participants: Vec::new(),
        }
    }
}

/// Partial room update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Room name must be 1-100 characters"))]
    pub name: Option<String>,

    /// Empty string clears the description
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,

    #[validate(range(min = 2, max = 1000, message = "Max participants must be 2-1000"))]
    pub max_participants: Option<u32>,

    pub allow_file_uploads: Option<bool>,

    #[validate(range(min = 1, max = 365, message = "Retention must be 1-365 days"))]
    pub message_retention_days: Option<u32>,

    pub require_approval: Option<bool>,

    /// Empty string removes the password
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: Option<String>,
}

impl UpdateRoomRequest {
    /// Fields only the owner may change
    pub fn touches_access(&self) -> bool {
        self.room_type.is_some() || self.require_approval.is_some() || self.password.is_some()
    }
}

/// Role change for a participant
#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleRequest {
    pub role: ParticipantRole,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Send message request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,

    #[serde(rename = "type", default)]
    pub message_type: MessageType,

    pub reply_to_id: Option<Snowflake>,

    pub metadata: Option<MessageMetadata>,
}

impl SendMessageRequest {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Edit message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageRequest {
    pub content: String,
}

/// Reaction toggle request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32, message = "Emoji must be 1-32 characters"))]
    pub emoji: String,
}

// ============================================================================
// Query Requests
// ============================================================================

/// History page request; page 1 holds the newest messages
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be 1-100"))]
    pub page_size: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// Message search request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100, message = "Query must be 1-100 characters"))]
    pub query: String,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be 1-100"))]
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_room_defaults() {
        let request: CreateRoomRequest = serde_json::from_value(json!({"name": "general"})).unwrap();
        assert_eq!(request.room_type, RoomType::Public);
        assert!(request.max_participants.is_none());
        assert!(!request.require_approval);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_room_ranges() {
        let request: CreateRoomRequest = serde_json::from_value(json!({
            "name": "general",
            "type": "private",
            "max_participants": 1,
            "message_retention_days": 400
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("max_participants"));
        assert!(fields.contains_key("message_retention_days"));

        let request = CreateRoomRequest::named("");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_send_message_wire_shape() {
        let request: SendMessageRequest = serde_json::from_value(json!({
            "content": "look",
            "type": "image",
            "reply_to_id": "42",
            "metadata": {"file_name": "cat.png", "file_size": 100}
        }))
        .unwrap();
        assert_eq!(request.message_type, MessageType::Image);
        assert_eq!(request.reply_to_id, Some(Snowflake::new(42)));
        assert_eq!(
            request.metadata.and_then(|m| m.file_name).as_deref(),
            Some("cat.png")
        );
    }

    #[test]
    fn test_history_query_bounds() {
        let query: HistoryQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!((query.page, query.page_size), (1, 50));

        let query = HistoryQuery {
            page: 0,
            page_size: 101,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_emoji_length_counts_characters() {
        let ok = ReactionRequest {
            emoji: "👍".to_string(),
        };
        assert!(ok.validate().is_ok());
        let empty = ReactionRequest {
            emoji: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_update_room_access_fields() {
        let patch = UpdateRoomRequest {
            name: Some("renamed".to_string()),
            ..UpdateRoomRequest::default()
        };
        assert!(!patch.touches_access());

        let patch = UpdateRoomRequest {
            password: Some(String::new()),
            ..UpdateRoomRequest::default()
        };
        assert!(patch.touches_access());
    }
}
