//! Gateway frame format
//!
//! Every text frame, in both directions, is `{"event", "data", "id"}`.
//! `id` is set by clients on requests and echoed on the direct reply only.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::events::GatewayEventType;

/// A single gateway frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Event name, e.g. `send-message` or `new-message`
    pub event: String,

    /// Event payload
    #[serde(default)]
    pub data: Value,

    /// Request id; outbound only on replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl GatewayMessage {
    // === Server Messages ===

    /// Create a broadcast frame
    #[must_use]
    pub fn event<T: Serialize>(event_type: GatewayEventType, data: &T) -> Self {
        Self {
            event: event_type.as_str().to_string(),
            data: serde_json::to_value(data).unwrap_or_default(),
            id: None,
        }
    }

    /// Create a reply frame echoing the request id
    #[must_use]
    pub fn reply<T: Serialize>(event_type: GatewayEventType, data: &T, id: Option<String>) -> Self {
        Self {
            id,
            ..Self::event(event_type, data)
        }
    }

    /// Create an `error` frame
    #[must_use]
    pub fn error(kind: &str, code: &str, message: &str, id: Option<String>) -> Self {
        Self {
            event: GatewayEventType::Error.as_str().to_string(),
            data: json!({
                "kind": kind,
                "code": code,
                "message": message,
            }),
            id,
        }
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check whether this frame carries the given event
    #[must_use]
    pub fn is(&self, event_type: GatewayEventType) -> bool {
        self.event == event_type.as_str()
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "GatewayMessage(event={}, id={id})", self.event),
            None => write!(f, "GatewayMessage(event={})", self.event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_frame_has_no_id() {
        let msg = GatewayMessage::event(
            GatewayEventType::UserOnline,
            &json!({"user_id": "1", "room_id": "2"}),
        );
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"event\":\"user-online\""));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_reply_echoes_id() {
        let msg = GatewayMessage::reply(
            GatewayEventType::RoomLeft,
            &json!({"room_id": "2"}),
            Some("req-7".to_string()),
        );
        assert_eq!(msg.id.as_deref(), Some("req-7"));
        assert!(msg.is(GatewayEventType::RoomLeft));
    }

    #[test]
    fn test_error_frame() {
        let msg = GatewayMessage::error("NOT_FOUND", "UNKNOWN_ROOM", "Room not found: 9", None);
        assert!(msg.is(GatewayEventType::Error));
        assert_eq!(msg.data["code"], "UNKNOWN_ROOM");
        assert_eq!(msg.data["kind"], "NOT_FOUND");
    }

    #[test]
    fn test_parse_inbound_frame() {
        let msg = GatewayMessage::from_json(r#"{"event":"list-rooms"}"#).unwrap();
        assert_eq!(msg.event, "list-rooms");
        assert_eq!(msg.data, Value::Null);
        assert!(msg.id.is_none());

        assert!(GatewayMessage::from_json(r#"{"data":{}}"#).is_err());
        assert!(GatewayMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_message_display() {
        let msg = GatewayMessage::reply(GatewayEventType::RoomList, &json!([]), Some("1".into()));
        assert_eq!(msg.to_string(), "GatewayMessage(event=room-list, id=1)");
    }
}
