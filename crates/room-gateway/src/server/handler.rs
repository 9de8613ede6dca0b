//! WebSocket handler
//!
//! Authenticates the upgrade, then runs one receive loop and one send loop
//! per connection.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{header::AUTHORIZATION, HeaderMap},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use room_core::DomainError;
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::connection::Connection;
use crate::handlers::{HandlerError, LifecycleHandler, MessageDispatcher};
use crate::protocol::{CloseCode, GatewayMessage, ProtocolError};
use crate::server::GatewayState;

/// Query parameters accepted on `/gateway`
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// WebSocket gateway handler
///
/// The credential comes from `?token=` or an `Authorization: Bearer` header.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let credential = params.token.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    });

    ws.on_upgrade(move |socket| handle_socket(state, socket, credential))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, mut socket: WebSocket, credential: Option<String>) {
    let session_id = Uuid::new_v4().to_string();

    let Some(credential) = credential else {
        tracing::debug!(session_id = %session_id, "Upgrade without credential");
        reject(
            &mut socket,
            CloseCode::NotAuthenticated,
            DomainError::Unauthenticated("No credential presented".to_string()),
        )
        .await;
        return;
    };

    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(state.config().rooms.outbound_buffer);

    let connection = match state
        .registry()
        .register(session_id.clone(), tx, &credential)
        .await
    {
        Ok(connection) => connection,
        Err(e) => {
            tracing::debug!(session_id = %session_id, error = %e, "Credential rejected");
            reject(&mut socket, CloseCode::AuthenticationFailed, e).await;
            return;
        }
    };

    tracing::info!(
        session_id = %session_id,
        user_id = %connection.user_id(),
        "WebSocket connection established"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Drain the outbound queue in FIFO order
    let session_id_send = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match msg.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(
                        session_id = %session_id_send,
                        error = %e,
                        "Failed to encode frame"
                    );
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                tracing::warn!(
                    session_id = %session_id_send,
                    "Failed to send message to WebSocket"
                );
                break;
            }
        }

        let _ = ws_sink.close().await;
    });

    LifecycleHandler::on_authenticated(&state, &connection).await;

    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text_message(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    let error = HandlerError::from(ProtocolError::BinaryFrame);
                    connection_recv.send(error.to_frame(None));
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    tracing::trace!(session_id = %connection_recv.session_id(), "Ping/pong");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        session_id = %connection_recv.session_id(),
                        "Client closed connection"
                    );
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %connection_recv.session_id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return Some(CloseCode::UnknownError);
                }
            }
        }
        None
    });

    tokio::select! {
        result = &mut recv_task => {
            if let Ok(Some(close_code)) = result {
                tracing::debug!(
                    session_id = %session_id,
                    close_code = %close_code,
                    "Receive task ended with close code"
                );
            }
            send_task.abort();
        }
        _ = &mut send_task => {
            tracing::debug!(session_id = %session_id, "Send task ended");
            recv_task.abort();
        }
    }

    LifecycleHandler::on_disconnected(&state, &connection);
}

/// Decode a text frame and dispatch it
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    match GatewayMessage::from_json(text) {
        Ok(message) => MessageDispatcher::dispatch(state, connection, message).await,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to parse message"
            );
            let error = HandlerError::from(ProtocolError::MalformedFrame(e.to_string()));
            connection.send(error.to_frame(None));
        }
    }
}

/// Send an `error` frame, then close with `code`
async fn reject(socket: &mut WebSocket, code: CloseCode, error: DomainError) {
    if let Ok(json) = HandlerError::from(error).to_frame(None).to_json() {
        let _ = socket.send(Message::Text(json)).await;
    }
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: code.as_u16(),
            reason: code.description().into(),
        })))
        .await;
}
