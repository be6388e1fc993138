//! Server wiring and lifecycle.
//!
//! `build_router` attaches the middleware stack and routes to a fresh
//! router; `start_server` binds the listener and runs until a termination
//! signal arrives. Configuration load strictly precedes registration,
//! which strictly precedes the listener accepting connections.

use std::future::IntoFuture;
use std::net::SocketAddr;

use anyhow::Context;
use axum::error_handling::HandleErrorLayer;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::load_shed::LoadShedLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::middleware::{log_requests, rate_limit, request_id, security_headers};
use crate::routes;
use crate::state::AppState;

/// Fixed ceiling on concurrently handled requests. Requests arriving
/// past it are shed with a 503 instead of queueing.
const MAX_IN_FLIGHT_REQUESTS: usize = 512;

/// Map errors escaping the load-shedding stack to responses.
async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::load_shed::error::Overloaded>() {
        ServerError::Overloaded.into_response()
    } else {
        ServerError::Internal(err.to_string()).into_response()
    }
}

/// Build the router with all middleware and routes attached.
///
/// Middleware, outermost first: trace, request logging, request id,
/// security headers, CORS (permissive in development, restrictive
/// otherwise), per-client rate limiting, load shedding. Routes: the
/// versioned API, the docs page, and a 404 fallback.
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.env.is_development() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(routes::api_routes())
        .route("/docs", get(routes::docs))
        .fallback(routes::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(LoadShedLayer::new())
                .layer(GlobalConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS)),
        )
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(cors)
        .layer(from_fn(security_headers))
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the tracing subscriber from the configured verbosity.
/// Pretty output in development, JSON elsewhere. `RUST_LOG` overrides
/// the configured level when set.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.env.is_development() {
        builder.init();
    } else {
        builder.json().init();
    }
}

/// Bind the configured address and serve until a termination signal.
///
/// On SIGINT or SIGTERM the process exits immediately with code 0;
/// in-flight requests are not drained. Bind failures propagate to the
/// caller, which exits non-zero.
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        env = %config.env,
        port = config.port,
        rate_limit_max = config.rate_limit_max,
        rate_limit_window_ms = config.rate_limit_window_ms,
        "Starting server"
    );

    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server running on http://{addr}");

    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .into_future();

    tokio::select! {
        result = serve => {
            result.context("server error")?;
        }
        signal = shutdown_signal() => {
            tracing::info!("Received {signal}, shutting down");
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Resolves when SIGINT (Ctrl+C) or SIGTERM arrives, yielding the
/// signal name for logging.
async fn shutdown_signal() -> &'static str {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
