//! Shared fixtures for service tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use room_common::RoomsConfig;
use room_core::Snowflake;
use room_store::{AttachmentPolicy, MemoryStore};

use super::context::{ServiceContext, ServiceContextBuilder};
use super::presence::{PresenceTracker, TypingObserver};

pub const ALICE: Snowflake = Snowflake::new(100);
pub const BOB: Snowflake = Snowflake::new(200);
pub const CAROL: Snowflake = Snowflake::new(300);
pub const DAVE: Snowflake = Snowflake::new(400);

#[derive(Default)]
pub struct StoppedTyping(Mutex<Vec<(Snowflake, Snowflake)>>);

impl StoppedTyping {
    pub fn events(&self) -> Vec<(Snowflake, Snowflake)> {
        self.0.lock().unwrap().clone()
    }
}

impl TypingObserver for StoppedTyping {
    fn typing_stopped(&self, room_id: Snowflake, user_id: Snowflake) {
        self.0.lock().unwrap().push((room_id, user_id));
    }
}

pub struct Fixture {
    pub ctx: ServiceContext,
    pub store: Arc<MemoryStore>,
    pub stopped: Arc<StoppedTyping>,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let stopped = Arc::new(StoppedTyping::default());
    let ctx = ServiceContextBuilder::new()
        .room_store(store.clone())
        .message_store(store.clone())
        .attachments(Arc::new(AttachmentPolicy::new(10 * 1024 * 1024)))
        .presence(Arc::new(PresenceTracker::new(
            Duration::from_secs(3),
            stopped.clone(),
        )))
        .config(RoomsConfig::default())
        .build()
        .unwrap();

    Fixture {
        ctx,
        store,
        stopped,
    }
}
