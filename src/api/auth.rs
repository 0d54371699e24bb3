//! Registration, email confirmation and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::{generate_token, hash_password, validate_password, verify_password, AuthError};
use crate::db::{users::NewUser, RepositoryError, UserRepository};
use crate::domain::aggregates::UserType;
use crate::domain::events::{DomainEvent, UserEvent};
use crate::domain::value_objects::Email;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(max = 50))]
    pub second_name: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(must_match(other = "password_rep", message = "passwords do not match"))]
    pub password: String,
    pub password_rep: String,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
}

#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Result<(StatusCode, Json<Value>)> {
    req.validate()?;
    let email = Email::parse(&req.email)?;
    validate_password(&req.password, &email)?;

    let require_confirmation = state.config.require_email_confirmation;
    let new = NewUser {
        email: email.clone(),
        password_hash: hash_password(&req.password)?,
        first_name: req.first_name,
        second_name: req.second_name,
        last_name: req.last_name,
        company: req.company,
        position: req.position,
        user_type: req.user_type,
        is_active: !require_confirmation,
    };
    let users = UserRepository::new(&state.db);
    let user = users.create(&new).await?;
    tracing::info!(user_id = %user.id, "user registered");

    if require_confirmation {
        let token = generate_token();
        users.store_confirm_token(user.id, &token).await?;
        state
            .publish(vec![DomainEvent::User(UserEvent::ConfirmationRequested {
                user_id: user.id,
                email: email.as_str().to_string(),
                token,
            })])
            .await;
    }

    Ok((StatusCode::CREATED, Json(json!({ "status": true, "user": user, "confirmation_required": require_confirmation }))))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub token: String,
}

pub async fn confirm(State(state): State<AppState>, Json(req): Json<ConfirmRequest>) -> Result<Json<Value>> {
    let email = Email::parse(&req.email)?;
    UserRepository::new(&state.db).confirm_email(&email, req.token.trim()).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::BadRequest("invalid email or token".to_string()),
        other => other.into(),
    })?;
    Ok(Json(json!({ "status": true })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[tracing::instrument(skip(state, req))]
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Result<Json<Value>> {
    let email = Email::parse(&req.email).map_err(|_| AuthError::InvalidCredentials)?;
    let users = UserRepository::new(&state.db);
    let (user, hash) = users.get_credentials(&email).await?.ok_or(AuthError::InvalidCredentials)?;
    verify_password(&req.password, &hash)?;
    if !user.is_active {
        return Err(AppError::Forbidden("account is not active".to_string()));
    }
    let token = users.issue_token(user.id, &generate_token()).await?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(json!({ "status": true, "token": token })))
}
