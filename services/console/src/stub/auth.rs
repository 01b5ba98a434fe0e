//! services/console/src/stub/auth.rs
//!
//! Login and logout endpoints. Login trades an email and password for a bearer
//! token; logout revokes the token it was called with.

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::stub::state::{BearerToken, Caller, StubState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// One of `admin`, `internal_accountant`, `external_accountant`, `client`.
    pub role: String,
    pub email: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<StubState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let rejected = || (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string());

    // 1. Find the account
    let user = state.user(&req.email).ok_or_else(rejected)?;

    // 2. Verify the password
    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| rejected())?;

    // 3. Issue a token
    let token = state
        .issue_token(Caller {
            email: user.email.clone(),
            role: user.role,
        })
        .await;
    info!("Issued token for {} ({})", user.email, user.role);

    Ok(Json(LoginResponse {
        token,
        role: user.role.as_str().to_string(),
        email: user.email.clone(),
    }))
}

/// POST /auth/logout - Revoke the calling token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Missing or unknown token")
    ),
    security(("bearer" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<StubState>>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> StatusCode {
    state.revoke_token(&token).await;
    StatusCode::NO_CONTENT
}
