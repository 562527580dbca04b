//! API handlers for the Biblio REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod openapi;
pub mod publishers;
pub mod reservations;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    error::AppError,
    models::user::{TokenKind, UserClaims},
    AppState,
};

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Extractor for an authenticated user from the access JWT
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Authentication("Missing or malformed authorization header".to_string())
        })?;

        let claims =
            UserClaims::from_token(token, &state.config.auth.jwt_secret, TokenKind::Access)?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor for endpoints that are public but behave differently for
/// authenticated callers. An absent or invalid token yields an anonymous
/// caller instead of a rejection.
pub struct MaybeUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_token(parts).and_then(|token| {
            UserClaims::from_token(token, &state.config.auth.jwt_secret, TokenKind::Access).ok()
        });

        Ok(MaybeUser(claims))
    }
}
