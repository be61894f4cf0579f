//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    Json,
};

use crate::cache::BoundedCache;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::models::{
    read_value, validate_key, HealthResponse, RemoveResponse, StatsResponse, WriteResponse,
};
use crate::store::KvStore;

/// Application state shared across all handlers.
///
/// Holds the coordinator (and through it the cache and store handles) plus
/// the payload limit applied to writes.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    pub max_value_size: usize,
}

impl AppState {
    /// Creates a new AppState over an existing cache and store.
    pub fn new(cache: Arc<BoundedCache>, store: Arc<dyn KvStore>, max_value_size: usize) -> Self {
        Self {
            coordinator: Coordinator::new(cache, store),
            max_value_size,
        }
    }

    /// Creates a new AppState with a fresh cache sized from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn KvStore>) -> Self {
        let cache = Arc::new(BoundedCache::new(config.cache_capacity));
        Self::new(cache, store, config.max_value_size)
    }

    pub fn cache(&self) -> &Arc<BoundedCache> {
        self.coordinator.cache()
    }
}

/// Handler for GET /kv/*key
///
/// Returns the raw value as the response body.
pub async fn read_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String> {
    validate_key(&key)?;
    state.coordinator.read(&key).await
}

/// Handler for PUT /kv/*key
///
/// Stores the full request body as the value for `key`.
pub async fn write_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Body,
) -> Result<Json<WriteResponse>> {
    validate_key(&key)?;
    let value = read_value(body, state.max_value_size).await?;

    state.coordinator.write(&key, value).await?;

    Ok(Json(WriteResponse::new(key)))
}

/// Handler for DELETE /kv/*key
pub async fn remove_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RemoveResponse>> {
    validate_key(&key)?;
    state.coordinator.remove(&key).await?;

    Ok(Json(RemoveResponse::new(key)))
}

/// Handler for any method on /kv/ with no key.
pub async fn missing_key_handler() -> Result<()> {
    validate_key("")
}

/// Handler for HEAD /kv/*key
///
/// Rejects HEAD explicitly; axum would otherwise answer it with the GET handler.
pub async fn head_rejected_handler() -> (StatusCode, [(header::HeaderName, &'static str); 1]) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET,PUT,DELETE")],
    )
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache();
    Json(StatsResponse::new(cache.stats(), cache.len(), cache.capacity()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KvError;
    use crate::store::MemoryStore;

    fn test_state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(Arc::new(BoundedCache::new(100)), store.clone(), 1024);
        (state, store)
    }

    #[tokio::test]
    async fn test_write_and_read_handler() {
        let (state, _) = test_state();

        let result = write_handler(
            State(state.clone()),
            Path("test_key".to_string()),
            Body::from("test_value"),
        )
        .await;
        assert!(result.is_ok());

        let value = read_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(value, "test_value");
    }

    #[tokio::test]
    async fn test_read_nonexistent_key() {
        let (state, _) = test_state();

        let result = read_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(KvError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_handler() {
        let (state, store) = test_state();
        store.put("to_delete", "value").await.unwrap();

        let result = remove_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = read_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_oversized_write_never_reaches_store() {
        let (state, store) = test_state();

        let result = write_handler(
            State(state.clone()),
            Path("big".to_string()),
            Body::from("x".repeat(2048)),
        )
        .await;

        assert!(matches!(result, Err(KvError::Validation(_))));
        assert_eq!(store.put_calls(), 0);
        assert!(!state.cache().contains("big"));
    }

    #[tokio::test]
    async fn test_missing_key_handler() {
        assert!(matches!(
            missing_key_handler().await,
            Err(KvError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, _) = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.capacity, 100);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
