//! Room services
//!
//! Services borrow a [`ServiceContext`] and are cheap to construct per call.

pub mod context;
pub mod error;
pub mod message;
pub mod presence;
pub mod room;

pub use context::{RoomGuard, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use message::{MessageRouter, ReactionToggle};
pub use presence::{PresenceTracker, TypingObserver, UserPresence};
pub use room::RoomDirectory;

#[cfg(test)]
pub(crate) mod testing;
