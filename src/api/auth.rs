//! Authentication and registration endpoints
//!
//! Login and token issuance return the access token in the body and deliver
//! the refresh token as an HTTP-only, Secure, SameSite=Strict cookie.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{Signup, User},
};

use super::AuthenticatedUser;

/// Name of the refresh token cookie
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Login / token issuance request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email; "username" is accepted as an alias for form clients
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

/// Login / token issuance response (access token; refresh is in the cookie)
#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub access: String,
    pub message: String,
}

/// New access token from a refresh
#[derive(Serialize, ToSchema)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn set_refresh_cookie(token: &str, max_age: u64) -> (header::HeaderName, String) {
    (
        header::SET_COOKIE,
        format!(
            "{}={}; HttpOnly; Secure; SameSite=Strict; Max-Age={}; Path=/",
            REFRESH_COOKIE, token, max_age
        ),
    )
}

fn clear_refresh_cookie() -> (header::HeaderName, String) {
    (
        header::SET_COOKIE,
        format!(
            "{}=; HttpOnly; Secure; SameSite=Strict; Max-Age=0; Path=/",
            REFRESH_COOKIE
        ),
    )
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body = Signup,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Password policy violation, mismatch or duplicate email")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    Json(request): Json<Signup>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let user = state.services.accounts.register(request).await?;

    tracing::info!(user_id = user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created successfully. Please login.".to_string(),
        }),
    ))
}

/// Authenticate and establish a session
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, tokens) = state
        .services
        .accounts
        .authenticate(&request.email, &request.password)
        .await?;

    Ok((
        [set_refresh_cookie(
            &tokens.refresh,
            state.config.auth.refresh_token_seconds,
        )],
        Json(TokenResponse {
            access: tokens.access,
            message: "Login successful.".to_string(),
        }),
    ))
}

/// Issue a JWT pair (same semantics as login)
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    )
)]
pub async fn issue_token(
    state: State<crate::AppState>,
    request: Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    login(state, request).await
}

/// Exchange the refresh cookie for a fresh access token
#[utoipa::path(
    post,
    path = "/token/refresh-access",
    tag = "auth",
    responses(
        (status = 200, description = "New access token", body = AccessResponse),
        (status = 401, description = "Missing or invalid refresh token")
    )
)]
pub async fn refresh_access(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<Json<AccessResponse>> {
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Authentication("No refresh token provided".to_string()))?;

    let access = state.services.accounts.refresh_access(&refresh).await?;
    Ok(Json(AccessResponse { access }))
}

/// Log out: clears the refresh cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout() -> impl IntoResponse {
    (
        [clear_refresh_cookie()],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Current caller's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller profile", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.accounts.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_is_hardened() {
        let (_, value) = set_refresh_cookie("tok", 86400);
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.contains("Max-Age=86400"));
    }

    #[test]
    fn clearing_sets_zero_max_age() {
        let (_, value) = clear_refresh_cookie();
        assert!(value.starts_with("refresh_token=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
