//! HTTP route handlers.
//!
//! The scaffold exposes one operational endpoint under the versioned API
//! prefix plus a static documentation page:
//!
//! - `GET /api/v1/health` - service status, timestamp, uptime
//! - `GET /docs` - API documentation page

pub mod health;

use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::error::ServerError;
use crate::state::AppState;

/// Versioned API routes. Registered once per router construction.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/api/v1/health", get(health::health_check))
}

/// API documentation page, mounted at /docs.
pub async fn docs() -> impl IntoResponse {
    Html(concat!(
        "<!doctype html>\n<html>\n<head><title>Microservice API</title></head>\n<body>\n",
        "<h1>Microservice API v",
        env!("CARGO_PKG_VERSION"),
        "</h1>\n",
        "<p>API documentation for the microservice scaffold.</p>\n",
        "<h2>Endpoints</h2>\n<ul>\n",
        "<li><code>GET /api/v1/health</code> - service status, timestamp and uptime</li>\n",
        "</ul>\n</body>\n</html>\n"
    ))
}

/// 404 handler for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
