//! Microservice scaffold entrypoint.
//!
//! Loads and validates configuration before anything else; a config
//! error or bind failure exits with code 1, signal-initiated shutdown
//! exits with code 0.

use scaffold::{server, AppConfig};

#[tokio::main]
async fn main() {
    // Logging is configured from the loaded config, so a config failure
    // is reported on stderr directly.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };

    server::init_logging(&config);

    if let Err(err) = server::start_server(config).await {
        tracing::error!("Error starting server: {err:#}");
        std::process::exit(1);
    }
}
