//! Shared fixtures for gateway tests

use std::collections::HashMap;
use std::sync::Arc;

use room_common::{AppConfig, JwtService};
use room_core::Snowflake;
use room_service::dto::CreateRoomRequest;
use room_service::RoomDirectory;
use room_store::MemoryStore;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::connection::Connection;
use crate::handlers::LifecycleHandler;
use crate::protocol::GatewayMessage;
use crate::server::{create_gateway_state_with_store, GatewayState};

pub const ALICE: Snowflake = Snowflake::new(100);
pub const BOB: Snowflake = Snowflake::new(200);
pub const CAROL: Snowflake = Snowflake::new(300);

const SECRET: &str = "gateway-test-secret-that-is-long-enough";

pub struct Harness {
    pub state: GatewayState,
    pub store: Arc<MemoryStore>,
    jwt: JwtService,
    next_session: std::sync::atomic::AtomicU32,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Build a harness with extra configuration keys
    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("GATEWAY_PORT".to_string(), "0".to_string()),
            ("JWT_SECRET".to_string(), SECRET.to_string()),
        ]);
        for (key, value) in extra {
            vars.insert((*key).to_string(), (*value).to_string());
        }
        let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let store = Arc::new(MemoryStore::new());
        let state = create_gateway_state_with_store(config, store.clone()).unwrap();

        Self {
            state,
            store,
            jwt: JwtService::new(SECRET, 900),
            next_session: std::sync::atomic::AtomicU32::new(1),
        }
    }

    /// Register an authenticated connection and run the connect lifecycle
    pub async fn connect(&self, user_id: Snowflake) -> (Arc<Connection>, mpsc::Receiver<GatewayMessage>) {
        let (connection, rx) = self.register(user_id).await;
        LifecycleHandler::on_authenticated(&self.state, &connection).await;
        (connection, rx)
    }

    /// Register an authenticated connection without running the lifecycle
    pub async fn register(&self, user_id: Snowflake) -> (Arc<Connection>, mpsc::Receiver<GatewayMessage>) {
        let (tx, rx) = mpsc::channel(64);
        let n = self
            .next_session
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let token = self.jwt.issue_access_token(user_id).unwrap();

        let connection = self
            .state
            .registry()
            .register(format!("session-{n}"), tx, &token)
            .await
            .unwrap();

        (connection, rx)
    }

    pub async fn create_room(&self, owner: Snowflake, name: &str) -> Snowflake {
        self.create_room_with(owner, json!({ "name": name })).await
    }

    pub async fn create_room_with(&self, owner: Snowflake, request: Value) -> Snowflake {
        let request: CreateRoomRequest = serde_json::from_value(request).unwrap();
        RoomDirectory::new(self.state.service_context())
            .create_room(owner, request)
            .await
            .unwrap()
            .id
    }

    pub async fn add_member(&self, room_id: Snowflake, actor: Snowflake, user_id: Snowflake) {
        RoomDirectory::new(self.state.service_context())
            .add_participant(room_id, actor, user_id)
            .await
            .unwrap();
    }

    /// Everything queued for a connection so far
    pub fn drain(rx: &mut mpsc::Receiver<GatewayMessage>) -> Vec<GatewayMessage> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Names of everything queued for a connection so far
    pub fn events(rx: &mut mpsc::Receiver<GatewayMessage>) -> Vec<String> {
        Self::drain(rx).into_iter().map(|f| f.event).collect()
    }
}

/// Build an inbound frame
pub fn frame(event: &str, data: Value, id: Option<&str>) -> GatewayMessage {
    GatewayMessage {
        event: event.to_string(),
        data,
        id: id.map(str::to_string),
    }
}
