//! Database access.
//!
//! # Tables
//!
//! - `users`, `auth_tokens`, `email_confirm_tokens` - accounts and login keys
//! - `contact_phones`, `contact_addresses` - the user's contact book
//! - `shops`, `categories`, `products`, `product_infos`, `parameters`,
//!   `product_parameters` - the catalog
//! - `orders`, `order_items`, `order_contacts` - baskets and placed orders
//!
//! Migrations live in `migrations/` and are applied by `sqlx::migrate!` at
//! start-up unless `RUN_MIGRATIONS=false`.

pub mod catalog;
pub mod orders;
pub mod pricing;
pub mod users;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::domain::aggregates::ProductError;

pub use catalog::CatalogRepository;
pub use orders::{OrderRepository, PlacementContact};
pub use pricing::PricingRepository;
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A basket line would exceed the offer's stock.
    #[error(transparent)]
    Stock(#[from] ProductError),
}

impl RepositoryError {
    /// Maps unique violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => Self::Conflict(format!("{what} already exists")),
            other => Self::Database(other),
        }
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}
