//! Data transfer objects exchanged with the gateway
//!
//! - Request DTOs with validation for inbound payloads
//! - Response DTOs for outbound frames

pub mod requests;
pub mod responses;

pub use requests::{
    CreateRoomRequest, EditMessageRequest, HistoryQuery, ReactionRequest, SearchQuery,
    SendMessageRequest, SetRoleRequest, UpdateRoomRequest,
};
pub use responses::{
    HistoryResponse, MessageResponse, ParticipantResponse, ReactionResponse, RoomResponse,
    RoomSettingsResponse,
};
