//! Error types for the key-value service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error ==
/// Failure reported by a durable store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Could not obtain a connection to the store
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed to execute an operation
    #[error("Store query failed: {0}")]
    Query(String),

    /// The store is not accepting requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Closed => {
                StoreError::Unavailable("connection pool is closed".to_string())
            }
            other => StoreError::Connection(other.to_string()),
        }
    }
}

// == Kv Error ==
/// Error returned by coordinator operations and HTTP handlers.
#[derive(Error, Debug)]
pub enum KvError {
    /// Malformed key or payload
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Key absent from the durable store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Durable store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KvError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KvError::NotFound(key) => (StatusCode::NOT_FOUND, format!("Key not found: {}", key)),
            KvError::Store(err) => {
                // Store details stay in the log
                tracing::error!(error = %err, "store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the key-value service.
pub type Result<T> = std::result::Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn error_body(err: KvError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let test_cases = vec![
            (KvError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
            (KvError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (
                KvError::Store(StoreError::Query("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let (status, json) = error_body(error).await;
            assert_eq!(status, expected_status);
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_store_error_hides_details() {
        let err = KvError::from(StoreError::Connection("password=hunter2".to_string()));
        let (_, json) = error_body(err).await;

        assert_eq!(json["error"], "Database error");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("pool closed".to_string());
        assert_eq!(err.to_string(), "Store unavailable: pool closed");
        assert_eq!(KvError::from(err).to_string(), "Store unavailable: pool closed");
    }
}
