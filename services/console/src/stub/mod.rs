//! services/console/src/stub/mod.rs
//!
//! An in-memory stand-in for the remote invoice-management API. It speaks the
//! same wire format the HTTP adapters expect, so the console can be exercised
//! end to end without the real backend.

pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use middleware::{record_request, require_bearer};
pub use state::{CollectionSpec, StubState, COLLECTIONS};

use auth::{login_handler, logout_handler};
use rest::{
    activate_record, create_record, deactivate_record, delete_record, list_records, update_record,
};

/// Mounts the record handlers under one collection's path.
fn collection_routes(spec: CollectionSpec) -> Router<Arc<StubState>> {
    let base = format!("/{}", spec.name);
    Router::new()
        .route(&base, get(list_records).post(create_record))
        .route(
            &format!("{}/{{id}}", base),
            put(update_record).delete(delete_record),
        )
        .route(&format!("{}/{{id}}/activate", base), put(activate_record))
        .route(&format!("{}/{{id}}/deactivate", base), put(deactivate_record))
        .layer(Extension(spec))
}

/// Builds the complete stub router: public login, bearer-protected
/// collections and logout, request logging and CORS.
pub fn router(state: Arc<StubState>) -> Router {
    let public_routes = Router::new().route("/auth/login", post(login_handler));

    let protected_routes = COLLECTIONS
        .iter()
        .fold(Router::new(), |router, spec| {
            router.merge(collection_routes(*spec))
        })
        .route("/auth/logout", post(logout_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            record_request,
        ))
        .layer(cors)
        .with_state(state)
}

/// Serves `app` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Stub API listening on {}", addr);
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
