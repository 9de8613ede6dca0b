//! Participant entity - a user's membership record in a room

use chrono::{DateTime, Utc};

use crate::value_objects::{ParticipantRole, Permissions, Snowflake};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub room_id: Snowflake,
    pub user_id: Snowflake,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
    pub muted: bool,
}

impl Participant {
    pub fn new(room_id: Snowflake, user_id: Snowflake, role: ParticipantRole) -> Self {
        Self {
            room_id,
            user_id,
            role,
            joined_at: Utc::now(),
            muted: false,
        }
    }

    pub fn member(room_id: Snowflake, user_id: Snowflake) -> Self {
        Self::new(room_id, user_id, ParticipantRole::Member)
    }

    pub fn owner(room_id: Snowflake, user_id: Snowflake) -> Self {
        Self::new(room_id, user_id, ParticipantRole::Owner)
    }

    #[inline]
    pub fn permissions(&self) -> Permissions {
        self.role.permissions()
    }

    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        self.role.has(permission)
    }

    /// Muted participants keep their role but may not post
    #[inline]
    pub fn can_send(&self) -> bool {
        !self.muted && self.has(Permissions::SEND_MESSAGES)
    }

    /// True when this participant may manage `other`
    #[inline]
    pub fn outranks(&self, other: &Participant) -> bool {
        self.role.outranks(other.role)
    }
}
