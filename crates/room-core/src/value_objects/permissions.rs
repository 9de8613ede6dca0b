//! Room permissions and the fixed role hierarchy
//!
//! Roles form a strict chain (owner ⊇ admin ⊇ moderator ⊇ member). Each role's
//! permission set is computed once, at compile time, from the role below it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Capabilities a participant holds inside one room
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u32 {
        /// Post messages and reactions
        const SEND_MESSAGES       = 1 << 0;
        /// Soft-delete messages authored by others
        const DELETE_ANY_MESSAGE  = 1 << 1;
        /// Add, kick, mute, and re-role participants ranked below oneself
        const MANAGE_PARTICIPANTS = 1 << 2;
        /// Change access settings (type, password, approval)
        const MANAGE_ROOM         = 1 << 3;
        /// Destroy the room
        const DELETE_ROOM         = 1 << 4;

        const MEMBER    = Self::SEND_MESSAGES.bits();
        const MODERATOR = Self::MEMBER.bits() | Self::DELETE_ANY_MESSAGE.bits();
        const ADMIN     = Self::MODERATOR.bits() | Self::MANAGE_PARTICIPANTS.bits();
        const OWNER     = Self::ADMIN.bits() | Self::MANAGE_ROOM.bits() | Self::DELETE_ROOM.bits();
    }
}

impl Permissions {
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        self.contains(permission)
    }

    /// Names of the individual flags that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list().join("|"))
    }
}

impl Serialize for Permissions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.list())
    }
}

/// Role of a participant within a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Owner,
    Admin,
    Moderator,
    Member,
}

const ROLE_PERMISSIONS: [Permissions; 4] = [
    Permissions::OWNER,
    Permissions::ADMIN,
    Permissions::MODERATOR,
    Permissions::MEMBER,
];

impl ParticipantRole {
    /// Position in the hierarchy; higher outranks lower
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Owner => 3,
            Self::Admin => 2,
            Self::Moderator => 1,
            Self::Member => 0,
        }
    }

    #[inline]
    pub const fn permissions(self) -> Permissions {
        ROLE_PERMISSIONS[(3 - self.rank()) as usize]
    }

    #[inline]
    pub fn has(self, permission: Permissions) -> bool {
        self.permissions().has(permission)
    }

    #[inline]
    pub const fn outranks(self, other: ParticipantRole) -> bool {
        self.rank() > other.rank()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown participant role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for ParticipantRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "member" => Ok(Self::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [ParticipantRole; 4] = [
        ParticipantRole::Owner,
        ParticipantRole::Admin,
        ParticipantRole::Moderator,
        ParticipantRole::Member,
    ];

    #[test]
    fn test_role_table() {
        assert_eq!(ParticipantRole::Member.permissions(), Permissions::SEND_MESSAGES);
        assert!(ParticipantRole::Moderator.has(Permissions::DELETE_ANY_MESSAGE));
        assert!(!ParticipantRole::Moderator.has(Permissions::MANAGE_PARTICIPANTS));
        assert!(ParticipantRole::Admin.has(Permissions::MANAGE_PARTICIPANTS));
        assert!(!ParticipantRole::Admin.has(Permissions::MANAGE_ROOM));
        assert!(ParticipantRole::Owner.has(Permissions::DELETE_ROOM));
    }

    #[test]
    fn test_higher_roles_are_supersets() {
        for pair in ALL_ROLES.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            assert!(upper.permissions().contains(lower.permissions()));
            assert_ne!(upper.permissions(), lower.permissions());
            assert!(upper.outranks(lower));
            assert!(!lower.outranks(upper));
        }
    }

    #[test]
    fn test_role_string_round_trip() {
        for role in ALL_ROLES {
            assert_eq!(role.as_str().parse::<ParticipantRole>().unwrap(), role);
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
        assert!("superuser".parse::<ParticipantRole>().is_err());
    }

    #[test]
    fn test_permissions_serialize_as_names() {
        let json = serde_json::to_value(ParticipantRole::Moderator.permissions()).unwrap();
        assert_eq!(json, serde_json::json!(["SEND_MESSAGES", "DELETE_ANY_MESSAGE"]));
    }
}
