//! # room-service
//!
//! Application layer: the room directory, the message router, the presence
//! and typing tracker, and the DTOs they exchange with the gateway.

pub mod dto;
pub mod services;

pub use services::{
    MessageRouter, PresenceTracker, ReactionToggle, RoomDirectory, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, TypingObserver, UserPresence,
};
