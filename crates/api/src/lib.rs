//! HTTP surface of the stockroom services: the gateway, the order service and
//! the inventory service, plus their shared auth and error handling.

use axum::http::StatusCode;

pub mod config;
pub mod context;
pub mod errors;
pub mod gateway;
pub mod inventory;
pub mod middleware;
pub mod orders;
pub mod server;

/// Liveness probe shared by all three services. Never authenticated.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
