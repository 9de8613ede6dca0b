//! Test helpers for integration tests
//!
//! Provides utilities for spawning a gateway on a local port and driving it
//! with real WebSocket clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response};
use room_common::{AppConfig, JwtService};
use room_core::Snowflake;
use room_gateway::protocol::GatewayMessage;
use room_gateway::{create_app, create_gateway_state_with_store};
use room_store::MemoryStore;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Secret shared by the test server and the token helper
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// How long a client waits for an expected frame
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    /// Backing store, for simulating outages
    pub store: Arc<MemoryStore>,
    jwt: JwtService,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config(&[])?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        // Ephemeral port; the listener reports the one it got
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));

        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);
        let store = Arc::new(MemoryStore::new());
        let state = create_gateway_state_with_store(config, store.clone())?;
        let app = create_app(state);

        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr: actual_addr,
            client,
            store,
            jwt,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Gateway URL carrying `token` as the credential
    pub fn gateway_url(&self, token: &str) -> String {
        format!("ws://{}/gateway?token={token}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Access token for a user
    pub fn token(&self, user_id: Snowflake) -> Result<String> {
        Ok(self.jwt.issue_access_token(user_id)?)
    }

    /// Connect as `user_id` and wait for `ready`
    pub async fn connect(&self, user_id: Snowflake) -> Result<WsClient> {
        let mut client = WsClient::connect(&self.gateway_url(&self.token(user_id)?)).await?;
        client.recv_event("ready").await?;
        Ok(client)
    }
}

/// Create a test configuration; `extra` overrides individual keys
pub fn test_config(extra: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("GATEWAY_PORT", "0".to_string()),
        ("JWT_SECRET", TEST_SECRET.to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(*key, (*value).to_string());
    }

    AppConfig::from_lookup(|key| vars.get(key).cloned())
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// One frame as seen by a client
#[derive(Debug)]
pub enum Received {
    Frame(GatewayMessage),
    Closed(Option<u16>),
}

/// WebSocket client speaking the gateway frame format
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await.context("WebSocket connect failed")?;
        Ok(Self { stream })
    }

    /// Send an event frame
    pub async fn send(&mut self, event: &str, data: Value, id: Option<&str>) -> Result<()> {
        let frame = GatewayMessage {
            event: event.to_string(),
            data,
            id: id.map(str::to_string),
        };
        self.stream.send(Message::Text(frame.to_json()?)).await?;
        Ok(())
    }

    /// Send raw text, bypassing the frame format
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Next frame or close, waiting at most `wait`
    pub async fn recv_within(&mut self, wait: Duration) -> Result<Option<Received>> {
        loop {
            let next = match tokio::time::timeout(wait, self.stream.next()).await {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(Received::Frame(GatewayMessage::from_json(&text)?)));
                }
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Some(Received::Closed(frame.map(|f| u16::from(f.code)))));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(Some(Received::Closed(None))),
            }
        }
    }

    /// Skip frames until one named `event` arrives
    pub async fn recv_event(&mut self, event: &str) -> Result<GatewayMessage> {
        loop {
            match self.recv_within(RECV_TIMEOUT).await? {
                Some(Received::Frame(frame)) if frame.event == event => return Ok(frame),
                Some(Received::Frame(_)) => continue,
                Some(Received::Closed(code)) => bail!("closed ({code:?}) waiting for {event}"),
                None => bail!("timed out waiting for {event}"),
            }
        }
    }

    /// Wait for the close frame, skipping any frames before it
    pub async fn recv_close(&mut self) -> Result<Option<u16>> {
        loop {
            match self.recv_within(RECV_TIMEOUT).await? {
                Some(Received::Frame(_)) => continue,
                Some(Received::Closed(code)) => return Ok(code),
                None => bail!("timed out waiting for close"),
            }
        }
    }

    /// Every frame that arrives within `wait`
    pub async fn collect(&mut self, wait: Duration) -> Result<Vec<GatewayMessage>> {
        let mut frames = Vec::new();
        while let Some(Received::Frame(frame)) = self.recv_within(wait).await? {
            frames.push(frame);
        }
        Ok(frames)
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
