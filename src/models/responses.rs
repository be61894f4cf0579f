//! Response DTOs for the key-value API
//!
//! Defines the structure of outgoing JSON response bodies. Reads return the
//! raw value instead.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for a successful write (PUT /kv/:key)
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
}

impl WriteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored successfully", key),
            key,
        }
    }
}

/// Response body for a successful remove (DELETE /kv/:key)
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl RemoveResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of resident entries
    pub entries: usize,
    /// Configured maximum number of entries
    pub capacity: usize,
    /// Hit rate percentage, 0.0 before the first lookup
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: StatsSnapshot, entries: usize, capacity: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            entries,
            capacity,
            hit_rate: stats.hit_rate().unwrap_or(0.0),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_response_serialize() {
        let resp = WriteResponse::new("my_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_remove_response_serialize() {
        let resp = RemoveResponse::new("deleted_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_key"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = StatsSnapshot {
            hits: 80,
            misses: 20,
            evictions: 5,
        };
        let resp = StatsResponse::new(stats, 10, 100);
        assert!((resp.hit_rate - 80.0).abs() < 0.001);
        assert_eq!(resp.entries, 10);
        assert_eq!(resp.capacity, 100);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(StatsSnapshot::default(), 0, 100);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
