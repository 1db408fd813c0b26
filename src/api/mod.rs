//! API Module
//!
//! HTTP handlers and routing for the cache REST API.
//!
//! # Endpoints
//! - `POST /caches` - Encode and store a tabular result
//! - `GET /caches/:id` - Read and decode a stored result
//! - `DELETE /caches/:id` - Delete a record
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
