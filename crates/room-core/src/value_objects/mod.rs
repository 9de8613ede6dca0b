//! Value objects - identifiers and the role/permission table

mod permissions;
mod snowflake;

pub use permissions::{ParticipantRole, Permissions, UnknownRole};
pub use snowflake::{MessageId, RoomId, Snowflake, SnowflakeGenerator, SnowflakeParseError, UserId};
