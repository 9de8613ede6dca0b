//! Message entity - a chat message with its reactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Kind of message content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    /// Generated by the server; clients may not send these
    System,
    Voice,
}

impl MessageType {
    /// Types whose content is a reference to an uploaded file
    #[inline]
    pub fn requires_attachment(self) -> bool {
        matches!(self, Self::Image | Self::File | Self::Voice)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::System => "system",
            Self::Voice => "voice",
        }
    }
}

/// File reference attached to non-text messages; the bytes live elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Voice clip length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
}

/// One (user, emoji) reaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user_id: Snowflake, emoji: String) -> Self {
        Self {
            user_id,
            emoji,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn matches(&self, user_id: Snowflake, emoji: &str) -> bool {
        self.user_id == user_id && self.emoji == emoji
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub room_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub message_type: MessageType,
    pub metadata: Option<MessageMetadata>,
    pub reply_to: Option<Snowflake>,
    /// Ordered by time added
    pub reactions: Vec<Reaction>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(
        id: Snowflake,
        room_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        message_type: MessageType,
    ) -> Self {
        Self {
            id,
            room_id,
            sender_id,
            content,
            message_type,
            metadata: None,
            reply_to: None,
            reactions: Vec::new(),
            created_at: Utc::now(),
            edited_at: None,
            deleted_at: None,
        }
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.edited_at = Some(Utc::now());
    }

    /// Marks the message deleted; content is kept for audit.
    ///
    /// Returns false if it was already deleted. `deleted_at` is never reset.
    pub fn soft_delete(&mut self) -> bool {
        if self.is_deleted() {
            return false;
        }
        self.deleted_at = Some(Utc::now());
        true
    }

    /// Adds the (user, emoji) reaction, or removes it if present.
    ///
    /// Returns true when the reaction was added.
    pub fn toggle_reaction(&mut self, user_id: Snowflake, emoji: &str) -> bool {
        if let Some(pos) = self.reactions.iter().position(|r| r.matches(user_id, emoji)) {
            self.reactions.remove(pos);
            false
        } else {
            self.reactions.push(Reaction::new(user_id, emoji.to_string()));
            true
        }
    }

    pub fn reaction_count(&self, emoji: &str) -> usize {
        self.reactions.iter().filter(|r| r.emoji == emoji).count()
    }

    /// Case-insensitive substring match on the content
    pub fn content_matches(&self, needle_lowercase: &str) -> bool {
        self.content.to_lowercase().contains(needle_lowercase)
    }
}
