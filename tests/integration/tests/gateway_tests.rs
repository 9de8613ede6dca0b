//! Gateway Integration Tests
//!
//! Each test starts an in-process gateway on a local port and talks to it
//! over real WebSocket connections.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use integration_tests::{
    room_ref, test_config, text_message, unique_user, CreateRoom, TestServer, WsClient,
};
use serde_json::json;

/// Create a room as `owner` and return its id
async fn create_room(owner: &mut WsClient, request: CreateRoom) -> String {
    owner
        .send("create-room", serde_json::to_value(request).unwrap(), Some("create"))
        .await
        .unwrap();
    let created = owner.recv_event("room-created").await.unwrap();
    created.data["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Connection
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_ready_on_connect() {
    let server = TestServer::start().await.unwrap();
    let user = unique_user();
    let token = server.token(user).unwrap();

    let mut client = WsClient::connect(&server.gateway_url(&token)).await.unwrap();
    let ready = client.recv_event("ready").await.unwrap();

    assert_eq!(ready.data["user_id"], user.to_string());
    assert!(!ready.data["session_id"].as_str().unwrap().is_empty());
    assert_eq!(ready.data["rooms"], json!([]));
}

#[tokio::test]
async fn test_bad_credential_closes_4004() {
    let server = TestServer::start().await.unwrap();

    let mut client = WsClient::connect(&server.gateway_url("not-a-jwt"))
        .await
        .unwrap();
    let error = client.recv_event("error").await.unwrap();
    assert_eq!(error.data["kind"], "UNAUTHENTICATED");

    assert_eq!(client.recv_close().await.unwrap(), Some(4004));
}

#[tokio::test]
async fn test_missing_credential_closes_4003() {
    let server = TestServer::start().await.unwrap();

    let url = format!("ws://{}/gateway", server.addr);
    let mut client = WsClient::connect(&url).await.unwrap();

    assert_eq!(client.recv_close().await.unwrap(), Some(4003));
}

#[tokio::test]
async fn test_malformed_frames_keep_connection_open() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect(unique_user()).await.unwrap();

    client.send_raw("{not json").await.unwrap();
    let error = client.recv_event("error").await.unwrap();
    assert_eq!(error.data["code"], "MALFORMED_FRAME");

    client.send("teleport", json!({}), Some("t")).await.unwrap();
    let error = client.recv_event("error").await.unwrap();
    assert_eq!(error.data["code"], "UNKNOWN_EVENT");
    assert_eq!(error.id.as_deref(), Some("t"));

    client.send("list-rooms", json!({}), Some("l")).await.unwrap();
    let rooms = client.recv_event("room-list").await.unwrap();
    assert_eq!(rooms.id.as_deref(), Some("l"));
}

// ============================================================================
// Rooms
// ============================================================================

#[tokio::test]
async fn test_room_capacity() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(unique_user()).await.unwrap();
    let mut bob = server.connect(unique_user()).await.unwrap();
    let mut carol = server.connect(unique_user()).await.unwrap();

    let room = create_room(&mut alice, CreateRoom::named("general").max(2)).await;

    bob.send("join-room", room_ref(&room), Some("j")).await.unwrap();
    let joined = bob.recv_event("room-joined").await.unwrap();
    assert_eq!(joined.data["room"]["id"], room.as_str());

    carol.send("join-room", room_ref(&room), Some("j")).await.unwrap();
    let error = carol.recv_event("error").await.unwrap();
    assert_eq!(error.data["kind"], "CAPACITY_EXCEEDED");

    alice.send("get-participants", room_ref(&room), None).await.unwrap();
    let participants = alice.recv_event("participants").await.unwrap();
    assert_eq!(participants.data["participants"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rooms_rejoined_on_reconnect() {
    let server = TestServer::start().await.unwrap();
    let user = unique_user();
    let mut alice = server.connect(user).await.unwrap();
    let room = create_room(&mut alice, CreateRoom::named("general")).await;
    alice.close().await.unwrap();

    let token = server.token(user).unwrap();
    let mut again = WsClient::connect(&server.gateway_url(&token)).await.unwrap();
    let ready = again.recv_event("ready").await.unwrap();
    assert_eq!(ready.data["rooms"], json!([room]));
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_message_reaches_members_only() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(unique_user()).await.unwrap();
    let mut bob = server.connect(unique_user()).await.unwrap();
    let mut carol = server.connect(unique_user()).await.unwrap();

    let room = create_room(&mut alice, CreateRoom::named("general")).await;
    bob.send("join-room", room_ref(&room), None).await.unwrap();
    bob.recv_event("room-joined").await.unwrap();

    alice
        .send("send-message", text_message(&room, "hello"), Some("m"))
        .await
        .unwrap();

    let reply = alice.recv_event("new-message").await.unwrap();
    assert_eq!(reply.id.as_deref(), Some("m"));

    let received = bob.recv_event("new-message").await.unwrap();
    assert_eq!(received.data["content"], "hello");

    let stray = carol.collect(Duration::from_millis(300)).await.unwrap();
    assert!(stray.iter().all(|f| f.event != "new-message"));
}

#[tokio::test]
async fn test_moderator_deletes_message() {
    let server = TestServer::start().await.unwrap();
    let bob_id = unique_user();
    let carol_id = unique_user();
    let mut alice = server.connect(unique_user()).await.unwrap();
    let mut bob = server.connect(bob_id).await.unwrap();
    let mut carol = server.connect(carol_id).await.unwrap();

    let room = create_room(&mut alice, CreateRoom::named("general")).await;
    for client in [&mut bob, &mut carol] {
        client.send("join-room", room_ref(&room), None).await.unwrap();
        client.recv_event("room-joined").await.unwrap();
    }

    alice
        .send(
            "set-role",
            json!({"room_id": room, "user_id": carol_id.to_string(), "role": "moderator"}),
            None,
        )
        .await
        .unwrap();
    carol.recv_event("participant-updated").await.unwrap();

    bob.send("send-message", text_message(&room, "regrettable"), None)
        .await
        .unwrap();
    let sent = bob.recv_event("new-message").await.unwrap();
    let message_id = sent.data["id"].as_str().unwrap().to_string();

    carol
        .send("delete-message", json!({"message_id": message_id}), None)
        .await
        .unwrap();
    carol.recv_event("message-deleted").await.unwrap();
    alice.recv_event("message-deleted").await.unwrap();
    bob.recv_event("message-deleted").await.unwrap();

    bob.send("fetch-history", room_ref(&room), None).await.unwrap();
    let history = bob.recv_event("history").await.unwrap();
    assert_eq!(history.data["messages"], json!([]));

    bob.send(
        "edit-message",
        json!({"message_id": message_id, "content": "never mind"}),
        None,
    )
    .await
    .unwrap();
    let error = bob.recv_event("error").await.unwrap();
    assert_eq!(error.data["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn test_store_outage_degrades_reads() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(unique_user()).await.unwrap();
    let room = create_room(&mut alice, CreateRoom::named("general")).await;

    server.store.set_available(false);

    alice.send("fetch-history", room_ref(&room), Some("h")).await.unwrap();
    let history = alice.recv_event("history").await.unwrap();
    assert_eq!(history.data["messages"], json!([]));
    let error = alice.recv_event("error").await.unwrap();
    assert_eq!(error.data["kind"], "UNAVAILABLE");

    server.store.set_available(true);
    alice.send("fetch-history", room_ref(&room), None).await.unwrap();
    alice.recv_event("history").await.unwrap();
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_disconnect_while_typing() {
    let config = test_config(&[("TYPING_TIMEOUT_MS", "10000")]).unwrap();
    let server = TestServer::start_with_config(config).await.unwrap();
    let bob_id = unique_user();
    let mut alice = server.connect(unique_user()).await.unwrap();
    let mut bob = server.connect(bob_id).await.unwrap();

    let room = create_room(&mut alice, CreateRoom::named("general")).await;
    bob.send("join-room", room_ref(&room), None).await.unwrap();
    bob.recv_event("room-joined").await.unwrap();

    bob.send("typing-start", room_ref(&room), None).await.unwrap();
    let typing = alice.recv_event("user-typing").await.unwrap();
    assert_eq!(typing.data["user_id"], bob_id.to_string());

    bob.close().await.unwrap();

    let frames = alice.collect(Duration::from_millis(500)).await.unwrap();
    let count = |name: &str| frames.iter().filter(|f| f.event == name).count();
    assert_eq!(count("user-stopped-typing"), 1);
    assert_eq!(count("user-offline"), 1);
}

#[tokio::test]
async fn test_typing_expires() {
    let config = test_config(&[("TYPING_TIMEOUT_MS", "200")]).unwrap();
    let server = TestServer::start_with_config(config).await.unwrap();
    let mut alice = server.connect(unique_user()).await.unwrap();
    let mut bob = server.connect(unique_user()).await.unwrap();

    let room = create_room(&mut alice, CreateRoom::named("general")).await;
    bob.send("join-room", room_ref(&room), None).await.unwrap();
    bob.recv_event("room-joined").await.unwrap();

    bob.send("typing-start", room_ref(&room), None).await.unwrap();
    alice.recv_event("user-typing").await.unwrap();

    let frames = alice.collect(Duration::from_millis(600)).await.unwrap();
    let stopped = frames
        .iter()
        .filter(|f| f.event == "user-stopped-typing")
        .count();
    assert_eq!(stopped, 1);
}
