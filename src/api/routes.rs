//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    head_rejected_handler, health_handler, missing_key_handler, read_handler, remove_handler,
    stats_handler, write_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|PUT|DELETE /kv/*key` - Read, write or remove a key (HEAD and other methods get 405)
/// - `/kv` and `/kv/` - Rejected with 400, the key is missing
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/kv/*key",
            get(read_handler)
                .head(head_rejected_handler)
                .put(write_handler)
                .delete(remove_handler),
        )
        .route("/kv", any(missing_key_handler))
        .route("/kv/", any(missing_key_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
