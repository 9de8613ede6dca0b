//! Gateway protocol definitions
//!
//! Frame format, inbound event parsing, and close codes.

mod close_codes;
mod inbound;
mod messages;

pub use close_codes::CloseCode;
pub use inbound::{ClientEvent, ProtocolError};
pub use messages::GatewayMessage;
