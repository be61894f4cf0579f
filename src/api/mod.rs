//! API Module
//!
//! HTTP handlers and routing for the key-value REST API.
//!
//! # Endpoints
//! - `GET /kv/*key` - Read a value (cache first, then store)
//! - `PUT /kv/*key` - Write the request body as the value
//! - `DELETE /kv/*key` - Remove a key
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
