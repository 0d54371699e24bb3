//! Router tests for paths that are rejected before any database access.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use shop_orders::{app, AppState, Config};

fn test_app() -> Router {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/shop_orders_test".to_string()),
        _ => None,
    })
    .unwrap();
    let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
    app(AppState::new(pool, None, config))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn basket_requires_token() {
    let (status, body) = send(Request::get("/user/basket").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn bearer_scheme_is_not_accepted() {
    let request = Request::get("/user/orders")
        .header(header::AUTHORIZATION, "Bearer abc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_route_requires_token() {
    let (status, _) = send(post_json("/staff/orders/1/status", json!({"status": "confirmed"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let (status, body) = send(post_json(
        "/user/register",
        json!({
            "first_name": "Viktor",
            "last_name": "Dyatlov",
            "email": "viktor@mail.de",
            "password": "kL9#mPq2vX",
            "password_rep": "kL9#mPq2vY",
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let (status, _) = send(post_json(
        "/user/register",
        json!({
            "first_name": "Viktor",
            "last_name": "Dyatlov",
            "email": "viktor@mail.de",
            "password": "12345678901",
            "password_rep": "12345678901",
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_card_requires_shop() {
    let (status, body) = send(Request::get("/user/products/1").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], "shop_id is required");
}
