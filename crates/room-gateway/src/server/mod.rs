//! Gateway server setup
//!
//! Provides the WebSocket server wiring and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use room_common::{AppConfig, AppError, JwtService};
use room_core::SnowflakeGenerator;
use room_service::{PresenceTracker, ServiceContextBuilder};
use room_store::{AttachmentPolicy, MemoryStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::broadcast::TypingBroadcaster;
use crate::connection::ConnectionRegistry;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies over a fresh in-memory store
///
/// # Errors
/// Returns an error if the service context cannot be assembled
pub fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    create_gateway_state_with_store(config, Arc::new(MemoryStore::new()))
}

/// Initialize all dependencies over the given store
///
/// # Errors
/// Returns an error if the service context cannot be assembled
pub fn create_gateway_state_with_store(
    config: AppConfig,
    store: Arc<MemoryStore>,
) -> Result<GatewayState, AppError> {
    let identity = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let registry = Arc::new(ConnectionRegistry::new(identity));

    // Typing removals from any path are fanned out through the registry
    let presence = Arc::new(PresenceTracker::new(
        config.rooms.typing_timeout(),
        Arc::new(TypingBroadcaster::new(registry.clone())),
    ));

    let service_context = ServiceContextBuilder::new()
        .room_store(store.clone())
        .message_store(store)
        .attachments(Arc::new(AttachmentPolicy::from_config(&config.storage)))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .presence(presence)
        .config(config.rooms.clone())
        .build()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build service context: {e}")))?;

    tracing::debug!(worker_id = config.snowflake.worker_id, "Gateway state initialized");

    Ok(GatewayState::new(service_context, registry, config))
}

/// Run the gateway server
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the complete gateway server with configuration
///
/// # Errors
/// Returns an error if the address is invalid or the server fails
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .gateway
        .address()
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], config.gateway.port)));

    let state = create_gateway_state(config)?;
    let app = create_app(state);

    run_server(app, addr).await
}
