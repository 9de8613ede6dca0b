//! Domain errors - every rule violation in the room core, grouped by kind

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::value_objects::Snowflake;

/// Coarse error taxonomy surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No valid identity
    Unauthenticated,
    /// Room, message, or participant absent
    NotFound,
    /// Role or permission violation, wrong password
    Forbidden,
    /// Room is full
    CapacityExceeded,
    /// Malformed or out-of-range input
    ValidationFailed,
    /// Store collaborator unreachable
    Unavailable,
    /// Defect inside the server
    Internal,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Authentication
    // =========================================================================
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("Room not found: {0}")]
    RoomNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("User {user_id} is not a participant of room {room_id}")]
    ParticipantNotFound { room_id: Snowflake, user_id: Snowflake },

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Message content cannot be empty")]
    EmptyContent,

    #[error("Invalid reply target: {0}")]
    InvalidReplyTarget(Snowflake),

    #[error("Attachment rejected: {0}")]
    AttachmentRejected(String),

    // =========================================================================
    // Authorization
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(&'static str),

    #[error("Not a participant of room {0}")]
    NotParticipant(Snowflake),

    #[error("Not room owner")]
    NotRoomOwner,

    #[error("Not message author")]
    NotMessageAuthor,

    #[error("Participant is muted")]
    ParticipantMuted,

    #[error("Room requires approval to join")]
    ApprovalRequired,

    #[error("Room password mismatch")]
    WrongPassword,

    #[error("Room is invite-only")]
    InviteOnly,

    #[error("Cannot leave owned room (delete it instead)")]
    CannotLeaveOwnedRoom,

    #[error("Cannot modify a participant of equal or higher role")]
    CannotModifyHigherRole,

    #[error("Owner role cannot be assigned")]
    CannotAssignOwner,

    #[error("File uploads are disabled in this room")]
    FileUploadsDisabled,

    #[error("System messages cannot be sent by clients")]
    SystemMessageNotAllowed,

    // =========================================================================
    // Capacity
    // =========================================================================
    #[error("Room is full: max {max} participants")]
    RoomFull { max: u32 },

    // =========================================================================
    // Infrastructure
    // =========================================================================
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,

            Self::RoomNotFound(_) | Self::MessageNotFound(_) | Self::ParticipantNotFound { .. } => {
                ErrorKind::NotFound
            }

            Self::ValidationError(_)
            | Self::ContentTooLong { .. }
            | Self::EmptyContent
            | Self::InvalidReplyTarget(_)
            | Self::AttachmentRejected(_) => ErrorKind::ValidationFailed,

            Self::MissingPermission(_)
            | Self::NotParticipant(_)
            | Self::NotRoomOwner
            | Self::NotMessageAuthor
            | Self::ParticipantMuted
            | Self::ApprovalRequired
            | Self::WrongPassword
            | Self::InviteOnly
            | Self::CannotLeaveOwnedRoom
            | Self::CannotModifyHigherRole
            | Self::CannotAssignOwner
            | Self::FileUploadsDisabled
            | Self::SystemMessageNotAllowed => ErrorKind::Forbidden,

            Self::RoomFull { .. } => ErrorKind::CapacityExceeded,

            Self::StoreUnavailable(_) => ErrorKind::Unavailable,
            Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Specific error code for client frames
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",

            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::ParticipantNotFound { .. } => "UNKNOWN_PARTICIPANT",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::InvalidReplyTarget(_) => "INVALID_REPLY_TARGET",
            Self::AttachmentRejected(_) => "ATTACHMENT_REJECTED",

            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::NotParticipant(_) => "NOT_PARTICIPANT",
            Self::NotRoomOwner => "NOT_ROOM_OWNER",
            Self::NotMessageAuthor => "NOT_MESSAGE_AUTHOR",
            Self::ParticipantMuted => "PARTICIPANT_MUTED",
            Self::ApprovalRequired => "APPROVAL_REQUIRED",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::InviteOnly => "INVITE_ONLY",
            Self::CannotLeaveOwnedRoom => "CANNOT_LEAVE_OWNED_ROOM",
            Self::CannotModifyHigherRole => "CANNOT_MODIFY_HIGHER_ROLE",
            Self::CannotAssignOwner => "CANNOT_ASSIGN_OWNER",
            Self::FileUploadsDisabled => "FILE_UPLOADS_DISABLED",
            Self::SystemMessageNotAllowed => "SYSTEM_MESSAGE_NOT_ALLOWED",

            Self::RoomFull { .. } => "ROOM_FULL",

            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Forbidden
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::ValidationFailed
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }
}
