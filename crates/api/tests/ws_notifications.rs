//! End-to-end WebSocket tests: the router is served on an ephemeral port and
//! a real client connects with `tokio-tungstenite`.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use common::{
    build_test_app, expect_json, post_json, seed_skill, seed_user, send, token_for, TestApp,
};
use futures::StreamExt;
use serde_json::json;
use skillswap_api::ws::guard::{INVALID_TOKEN_MESSAGE, MISSING_TOKEN_MESSAGE};
use skillswap_core::roles::Role;
use skillswap_core::types::DbId;
use tokio_tungstenite::tungstenite::{self, Message};

async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Registration happens after the upgrade completes, so poll for it.
async fn wait_until_online(app: &TestApp, user_id: DbId) {
    for _ in 0..100 {
        if app.sessions.is_online(user_id).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("user {user_id} never registered");
}

async fn next_json<S>(socket: &mut S) -> serde_json::Value
where
    S: futures::Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("socket closed")
        .expect("socket error");
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

fn http_status(err: tungstenite::Error) -> u16 {
    match err {
        tungstenite::Error::Http(response) => response.status().as_u16(),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: the guard answers plain HTTP with distinct 401 messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn guard_distinguishes_missing_and_invalid_tokens() {
    let app = build_test_app();

    let missing = send(&app.router, Method::GET, "/api/v1/ws", None, None).await;
    let missing = expect_json(missing, StatusCode::UNAUTHORIZED).await;
    assert_eq!(missing["error"], MISSING_TOKEN_MESSAGE);

    let invalid = send(&app.router, Method::GET, "/api/v1/ws?token=forged", None, None).await;
    let invalid = expect_json(invalid, StatusCode::UNAUTHORIZED).await;
    assert_eq!(invalid["error"], INVALID_TOKEN_MESSAGE);
}

// ---------------------------------------------------------------------------
// Test: handshake without a token is rejected before upgrade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handshake_without_token_is_rejected() {
    let app = build_test_app();
    let addr = serve(&app).await;

    let err = tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws"))
        .await
        .unwrap_err();
    assert_eq!(http_status(err), 401);
    assert_eq!(app.sessions.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: handshake with a bad token is rejected with a different message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handshake_with_invalid_token_is_rejected() {
    let app = build_test_app();
    let addr = serve(&app).await;

    let err = tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws?token=forged"))
        .await
        .unwrap_err();
    assert_eq!(http_status(err), 401);
    assert_eq!(app.sessions.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: receiver gets new/accepted notifications; disconnect unregisters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn receiver_is_notified_of_request_lifecycle() {
    let app = build_test_app();
    let addr = serve(&app).await;
    let sender = seed_user(&app.store, "Sasha", Role::User).await;
    let receiver = seed_user(&app.store, "Roma", Role::User).await;
    let guitar = seed_skill(&app.store, &sender, "Guitar").await;
    let spanish = seed_skill(&app.store, &receiver, "Spanish").await;
    let receiver_token = token_for(&receiver);

    let (mut socket, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws?token={receiver_token}"))
            .await
            .expect("authenticated handshake should upgrade");
    wait_until_online(&app, receiver.id).await;

    let created = post_json(
        &app.router,
        "/api/v1/requests",
        &token_for(&sender),
        json!({ "offeredSkillId": guitar.id, "requestedSkillId": spanish.id }),
    )
    .await;
    assert_eq!(created.status(), 201);
    let created = common::body_json(created).await;

    let frame = next_json(&mut socket).await;
    assert_eq!(
        frame,
        json!({
            "event": "notificateNewRequest",
            "data": { "type": "new_request", "skillName": "Spanish", "sender": "Sasha" }
        })
    );

    let accepted = common::patch_json(
        &app.router,
        &format!("/api/v1/requests/{}", created["id"].as_str().unwrap()),
        &receiver_token,
        json!({ "action": "accept" }),
    )
    .await;
    assert_eq!(accepted.status(), 200);

    // Accept/decline notifications go to the request's receiver.
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["data"]["type"], "accepted_request");
    assert_eq!(frame["data"]["skillName"], "Spanish");
    assert_eq!(frame["data"]["sender"], "Sasha");

    socket.close(None).await.unwrap();
    for _ in 0..100 {
        if !app.sessions.is_online(receiver.id).await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!app.sessions.is_online(receiver.id).await);
}

// ---------------------------------------------------------------------------
// Test: the token may be repeated; the first value is used
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_token_parameter_uses_first_value() {
    let app = build_test_app();
    let addr = serve(&app).await;
    let user = seed_user(&app.store, "Roma", Role::User).await;

    let url = format!(
        "ws://{addr}/api/v1/ws?token={}&token=ignored",
        token_for(&user)
    );
    let (_socket, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("first token is valid");
    wait_until_online(&app, user.id).await;
}
