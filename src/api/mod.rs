//! HTTP routes.

pub mod auth;
pub mod basket;
pub mod catalog;
pub mod extract;
pub mod orders;
pub mod staff;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": env!("CARGO_PKG_NAME") }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/user/register", post(auth::register))
        .route("/user/register/confirm", post(auth::confirm))
        .route("/user/login", post(auth::login))
        .route("/user/products", get(catalog::list_products))
        .route("/user/products/:id", get(catalog::get_product))
        .route(
            "/user/basket",
            get(basket::get_basket)
                .post(basket::add_items)
                .put(basket::update_items)
                .delete(basket::remove_items),
        )
        .route("/user/accept_order", post(orders::accept_order))
        .route("/user/greeting", get(orders::greeting))
        .route("/user/orders", get(orders::list_orders))
        .route("/user/order/:id", get(orders::get_order))
        .route("/user/order/:id/cancel", post(orders::cancel_order))
        .route("/staff/orders/:id/status", post(staff::set_status))
}
