//! Request and Response models for the key-value API
//!
//! Key/payload validation and the JSON DTOs returned by the handlers.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{read_value, validate_key, MAX_KEY_LENGTH};
pub use responses::{HealthResponse, RemoveResponse, StatsResponse, WriteResponse};
