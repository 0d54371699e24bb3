//! Authentication extractors.
//!
//! Requests authenticate with `Authorization: Token <key>`, the key handed
//! out by `/user/login`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::UserRepository;
use crate::domain::aggregates::User;
use crate::error::AppError;
use crate::state::AppState;

const SCHEME: &str = "Token ";

/// Extractor that requires an active, logged-in user.
pub struct AuthUser(pub User);

/// Extractor that requires a logged-in staff member.
pub struct StaffUser(pub User);

fn token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(SCHEME)
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = token(parts).ok_or(AppError::Unauthorized)?;
        let user = UserRepository::new(&state.db).get_by_token(key).await?.ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::Forbidden("account is not active".to_string()));
        }
        Ok(Self(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(AppError::Forbidden("staff only".to_string()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/user/basket");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_scheme() {
        assert_eq!(token(&parts(Some("Token abc123"))), Some("abc123"));
        assert_eq!(token(&parts(Some("Bearer abc123"))), None);
        assert_eq!(token(&parts(Some("Token   "))), None);
        assert_eq!(token(&parts(None)), None);
    }
}
