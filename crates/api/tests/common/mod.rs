//! Shared helpers for API integration tests.
//!
//! Each test binary uses a different subset, hence the blanket `dead_code`
//! allowance.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Days, NaiveDate, Utc};
use http_body_util::BodyExt;
use lodge_api::auth::jwt::{generate_access_token, JwtConfig};
use lodge_api::auth::password::hash_password;
use lodge_api::config::{BookingPolicy, ServerConfig};
use lodge_api::router::build_app_router;
use lodge_api::state::AppState;
use lodge_core::types::Money;
use lodge_db::models::room::{CreateRoom, Room};
use lodge_db::models::user::{CreateUser, User};
use lodge_db::repositories::{RoomRepo, UserRepo};
use lodge_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password given to every seeded user.
pub const TEST_PASSWORD: &str = "Lodge-Test-42";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiry_mins: 60,
        },
        booking: BookingPolicy::default(),
        bootstrap_admin: None,
        seed_rooms: false,
    }
}

/// Build the full application router, exactly as `main.rs` does.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone(), Arc::new(EventBus::default()));
    build_app_router(state, &config)
}

/// Like [`build_test_app`], also returning the event bus so tests can
/// subscribe to published booking events.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let bus = Arc::new(EventBus::default());
    let state = AppState::new(pool, config.clone(), Arc::clone(&bus));
    (build_app_router(state, &config), bus)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, None, Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub fn money(s: &str) -> Money {
    Money::from_str(s).unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `today + n` days, formatted `YYYY-MM-DD`.
pub fn days_from_now(n: u64) -> String {
    today()
        .checked_add_days(Days::new(n))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

pub async fn seed_room(pool: &PgPool, number: &str, capacity: i32, price: &str) -> Room {
    RoomRepo::create(
        pool,
        &CreateRoom {
            name: format!("Historic Room {number}"),
            room_number: number.to_string(),
            room_type: "HISTORIC".to_string(),
            description: Some("Original 1909 lodge room".to_string()),
            capacity,
            base_price: money(price),
            amenities: vec!["Queen bed".to_string()],
            images: vec![],
        },
    )
    .await
    .expect("room creation should succeed")
}

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@lodge.test"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// A signed token for `user`, using the test JWT secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.username, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

pub async fn staff_token(pool: &PgPool) -> String {
    token_for(&seed_user(pool, "frontdesk", "staff").await)
}

pub async fn admin_token(pool: &PgPool) -> String {
    token_for(&seed_user(pool, "manager", "admin").await)
}

/// A complete, valid `POST /reservations` body.
pub fn reservation_body(room_id: i64, check_in: &str, check_out: &str, guests: i32) -> serde_json::Value {
    serde_json::json!({
        "roomId": room_id,
        "checkIn": check_in,
        "checkOut": check_out,
        "guests": guests,
        "guestInfo": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": "928-555-0100"
        },
        "specialRequests": "Late arrival"
    })
}
