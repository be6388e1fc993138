//! Minimal HTTP microservice scaffold.
//!
//! Loads a typed configuration from the environment (fail-fast on any
//! invalid or missing value), wires an Axum server with the standard
//! middleware stack (security headers, CORS, rate limiting, load
//! shedding, request logging) plus a docs page, registers a health
//! endpoint under `/api/v1`, and serves until SIGINT/SIGTERM.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use scaffold::{server, AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     server::init_logging(&config);
//!     server::start_server(config).await
//! }
//! ```
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - status, ISO-8601 timestamp, uptime seconds
//! - `GET /docs` - API documentation page

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AppConfig, ConfigError, Environment, LogLevel};
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::AppState;
