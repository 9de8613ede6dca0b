//! Domain entities

mod message;
mod participant;
mod room;

pub use message::{Message, MessageMetadata, MessageType, Reaction};
pub use participant::Participant;
pub use room::{Room, RoomSettings, RoomType};
