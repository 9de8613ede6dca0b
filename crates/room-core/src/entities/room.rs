//! Room entity - a named channel with membership and settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Room visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    /// Anyone may join (subject to password and approval settings)
    #[default]
    Public,
    /// Joinable with the room password, otherwise invite-only
    Private,
    /// Two-person conversation, invite-only
    Direct,
}

/// Per-room settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSettings {
    pub max_participants: u32,
    pub allow_file_uploads: bool,
    pub message_retention_days: u32,
    pub require_approval: bool,
    /// Argon2 hash; `None` means no password
    pub password_hash: Option<String>,
}

impl RoomSettings {
    pub const MIN_PARTICIPANTS: u32 = 2;
    pub const MAX_PARTICIPANTS: u32 = 1000;
    pub const DEFAULT_MAX_PARTICIPANTS: u32 = 100;
    pub const DIRECT_MAX_PARTICIPANTS: u32 = 2;
    pub const DEFAULT_RETENTION_DAYS: u32 = 30;

    #[inline]
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_participants: Self::DEFAULT_MAX_PARTICIPANTS,
            allow_file_uploads: true,
            message_retention_days: Self::DEFAULT_RETENTION_DAYS,
            require_approval: false,
            password_hash: None,
        }
    }
}

/// Room entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub room_type: RoomType,
    pub owner_id: Snowflake,
    pub settings: RoomSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        id: Snowflake,
        name: String,
        room_type: RoomType,
        owner_id: Snowflake,
        settings: RoomSettings,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: None,
            room_type,
            owner_id,
            settings,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Whether a user can join without being added by a manager
    ///
    /// Password checks happen separately; this only reflects the room shape.
    pub fn allows_self_join(&self) -> bool {
        if self.settings.require_approval {
            return false;
        }
        match self.room_type {
            RoomType::Public => true,
            RoomType::Private => self.settings.has_password(),
            RoomType::Direct => false,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(room_type: RoomType) -> Room {
        Room::new(
            Snowflake::new(1),
            "general".to_string(),
            room_type,
            Snowflake::new(100),
            RoomSettings::default(),
        )
    }

    #[test]
    fn test_defaults() {
        let settings = RoomSettings::default();
        assert_eq!(settings.max_participants, 100);
        assert_eq!(settings.message_retention_days, 30);
        assert!(settings.allow_file_uploads);
        assert!(!settings.require_approval);
        assert!(!settings.has_password());
    }

    #[test]
    fn test_self_join_rules() {
        assert!(room(RoomType::Public).allows_self_join());
        assert!(!room(RoomType::Private).allows_self_join());
        assert!(!room(RoomType::Direct).allows_self_join());

        let mut private = room(RoomType::Private);
        private.settings.password_hash = Some("$argon2id$...".to_string());
        assert!(private.allows_self_join());

        let mut gated = room(RoomType::Public);
        gated.settings.require_approval = true;
        assert!(!gated.allows_self_join());
    }

    #[test]
    fn test_owner() {
        let room = room(RoomType::Public);
        assert!(room.is_owner(Snowflake::new(100)));
        assert!(!room.is_owner(Snowflake::new(200)));
    }
}
