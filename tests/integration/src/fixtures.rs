//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use room_core::Snowflake;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};

/// Counter for unique test users
static COUNTER: AtomicI64 = AtomicI64::new(1_000);

/// A user id no other test uses
pub fn unique_user() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// `create-room` payload
#[derive(Debug, Serialize)]
pub struct CreateRoom {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub room_type: Option<&'static str>,
}

impl CreateRoom {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            max_participants: None,
            room_type: None,
        }
    }

    #[must_use]
    pub fn max(mut self, max_participants: u32) -> Self {
        self.max_participants = Some(max_participants);
        self
    }
}

/// Payload addressing a single room
pub fn room_ref(room_id: &str) -> Value {
    json!({ "room_id": room_id })
}

/// `send-message` payload for a text message
pub fn text_message(room_id: &str, content: &str) -> Value {
    json!({ "room_id": room_id, "content": content })
}
