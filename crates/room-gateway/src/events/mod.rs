//! Gateway events
//!
//! Event names and the payloads carried in each direction.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{
    EditMessagePayload, HistoryPayload, JoinRoomPayload, MessageIdPayload, ParticipantPayload,
    ParticipantsEvent, ReactionPayload, ReactionUpdatedEvent, ReadyEvent, RoomIdPayload,
    RoomJoinedEvent, RoomListEvent, RoomRefEvent, SearchPayload, SendMessagePayload,
    SetMutedPayload, SetRolePayload, UpdateRoomPayload, UserRoomEvent,
};
