//! Request validation for the key-value API
//!
//! Keys arrive in the URL path and values as the raw request body; both are
//! checked here before the coordinator sees them.

use axum::body::{to_bytes, Body};

use crate::error::{KvError, Result};

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Checks that a path key is usable.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::Validation("Key is missing".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(KvError::Validation(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Reads the whole request body as the value to store.
///
/// Bodies over `limit` bytes, bodies that fail mid-read and bodies that are
/// not UTF-8 are all rejected rather than truncated.
pub async fn read_value(body: Body, limit: usize) -> Result<String> {
    let bytes = to_bytes(body, limit).await.map_err(|_| {
        KvError::Validation(format!(
            "Value could not be read or exceeds maximum size of {} bytes",
            limit
        ))
    })?;

    String::from_utf8(bytes.to_vec())
        .map_err(|_| KvError::Validation("Value must be valid UTF-8".to_string()))
}
