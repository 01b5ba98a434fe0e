//! services/console/src/stub/middleware.rs
//!
//! Bearer-token authentication and request logging for the stub API.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::stub::state::{BearerToken, StubState};

/// Resolves the `Authorization: Bearer` token to its caller.
///
/// On success the `Caller` and the raw `BearerToken` are inserted into the
/// request extensions. Missing, malformed or revoked tokens get 401.
pub async fn require_bearer(
    State(state): State<Arc<StubState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the bearer token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Look up who it belongs to
    let caller = state.resolve_token(&token).await.ok_or_else(|| {
        warn!("Rejected unknown bearer token on {}", req.uri().path());
        StatusCode::UNAUTHORIZED
    })?;

    // 3. Hand both to the handler
    req.extensions_mut().insert(caller);
    req.extensions_mut().insert(BearerToken(token));

    Ok(next.run(req).await)
}

/// Appends `METHOD /path` to the request log before anything else runs.
pub async fn record_request(
    State(state): State<Arc<StubState>>,
    req: Request,
    next: Next,
) -> Response {
    state
        .log_request(format!("{} {}", req.method(), req.uri().path()))
        .await;
    next.run(req).await
}
