//! # room-core
//!
//! Domain layer for the room messaging gateway: entities, value objects,
//! errors, and the traits implemented by storage and identity collaborators.
//! No runtime or transport dependencies live here.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

pub use entities::{Message, MessageMetadata, MessageType, Participant, Reaction, Room, RoomSettings, RoomType};
pub use error::{DomainError, ErrorKind};
pub use traits::{
    AttachmentService, IdentityProvider, MessageQuery, MessageStore, RepoResult, RoomStore,
};
pub use value_objects::{
    MessageId, ParticipantRole, Permissions, RoomId, Snowflake, SnowflakeGenerator,
    SnowflakeParseError, UnknownRole, UserId,
};
