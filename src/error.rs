//! Unified error handling.
//!
//! Every handler returns `Result<T, AppError>`. Responses share one body
//! shape, `{"status": false, "errors": ...}`, where `errors` is a message,
//! a field map or a structured pricing failure.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthError;
use crate::db::RepositoryError;
use crate::domain::aggregates::{BasketError, OrderError, ProductError};
use crate::domain::value_objects::EmailError;
use crate::pricing::PricingError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Request fields failed validation; carries a field → messages map.
    #[error("validation failed")]
    Validation(Value),

    #[error("{0}")]
    BadRequest(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Basket(#[from] BasketError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Order(#[from] OrderError),

    /// Stored data could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: BTreeMap<&str, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), ToString::to_string))
                    .collect();
                (field, messages)
            })
            .collect();
        Self::Validation(json!(fields))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::Email(_) | Self::Basket(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::Product(_) => StatusCode::CONFLICT,
            Self::Auth(err) => match err {
                AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::UnknownStatus(_) | OrderError::NoItems => StatusCode::BAD_REQUEST,
                OrderError::CannotCancel | OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
            },
            Self::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Repository(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) | RepositoryError::Stock(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(fields) => fields.clone(),
            Self::Pricing(err) => json!(err),
            Self::Repository(RepositoryError::NotFound) => json!("not found"),
            Self::Repository(RepositoryError::Conflict(msg)) => json!(msg),
            Self::Repository(RepositoryError::Stock(err)) => json!(err.to_string()),
            _ if self.status_code().is_server_error() => json!("internal server error"),
            other => json!(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else if let Self::Pricing(err) = &self {
            tracing::warn!(error = %err, "pricing failed");
        }
        (status, Json(json!({ "status": false, "errors": self.body() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
