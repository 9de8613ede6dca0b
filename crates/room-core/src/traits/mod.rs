//! Ports implemented by infrastructure crates

mod collaborators;
mod repositories;

pub use collaborators::{AttachmentService, IdentityProvider};
pub use repositories::{MessageQuery, MessageStore, RepoResult, RoomStore};
