//! Event broadcasting
//!
//! Per-room ordering of accepted mutations and typing-expiry fan-out.

mod sequencer;
mod typing;

pub use sequencer::{RoomSequencer, RoomTurn};
pub use typing::TypingBroadcaster;
