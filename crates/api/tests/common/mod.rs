#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use skillswap_api::auth::jwt::{generate_access_token, JwtConfig};
use skillswap_api::config::ServerConfig;
use skillswap_api::router::build_app_router;
use skillswap_api::state::AppState;
use skillswap_api::ws::SessionRegistry;
use skillswap_core::roles::Role;
use skillswap_db::models::skill::{CreateSkill, Skill};
use skillswap_db::models::user::{CreateUser, User};
use skillswap_db::MemoryExchangeStore;

pub const TEST_SECRET: &str = "integration-test-secret-long-enough";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Everything a test needs to drive the app and inspect its side effects.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryExchangeStore>,
    pub sessions: Arc<SessionRegistry>,
}

/// Build the production router over an in-memory store.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryExchangeStore::new());
    let sessions = Arc::new(SessionRegistry::new());
    let state = AppState::new(store.clone(), config.clone(), Arc::clone(&sessions));
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        store,
        sessions,
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_user(store: &MemoryExchangeStore, name: &str, role: Role) -> User {
    store
        .add_user(CreateUser {
            name: name.to_string(),
            email: format!("{}@example.test", name.to_lowercase()),
            password_hash: "$argon2id$v=19$not-a-real-hash".to_string(),
            role,
        })
        .await
}

pub async fn seed_skill(store: &MemoryExchangeStore, owner: &User, title: &str) -> Skill {
    store
        .add_skill(CreateSkill {
            title: title.to_string(),
            description: Some(format!("{title} lessons")),
            owner_id: owner.id,
        })
        .await
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read the whole body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
