//! Shop orders service
//!
//! Customer-facing backend for a multi-shop marketplace.
//!
//! ## Features
//! - Registration with optional email confirmation, token login
//! - Product catalog with per-shop offers
//! - Basket management, one basket per customer
//! - Order placement with a contact snapshot
//! - Order history with prices and delivery cost derived at read time
//! - Order lifecycle events over NATS

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod pricing;
pub mod state;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::AppError;
pub use state::AppState;

/// The full application with tracing and CORS layers applied.
pub fn app(state: AppState) -> Router {
    api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
