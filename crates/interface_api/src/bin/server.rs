//! sika-core - API Server Binary
//!
//! This binary starts the HTTP API server for the payment platform.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin sika-api
//!
//! # Run with environment variables
//! SIKA_HOST=0.0.0.0 SIKA_PORT=8080 SIKA_PAYSTACK_SECRET_KEY=sk_live_... cargo run --bin sika-api
//! ```
//!
//! # Environment Variables
//!
//! * `SIKA_HOST` - Server host (default: 0.0.0.0)
//! * `SIKA_PORT` - Server port (default: 8080)
//! * `SIKA_JWT_SECRET` - JWT validation secret (required in production)
//! * `SIKA_JWT_EXPIRATION_SECS` - Token expiration in seconds (default: 3600)
//! * `SIKA_PAYSTACK_SECRET_KEY` - Gateway integration secret (required in production)
//! * `SIKA_PAYSTACK_BASE_URL` - Gateway API base URL (default: https://api.paystack.co)
//! * `SIKA_GATEWAY_TIMEOUT_SECS` - Outbound gateway call timeout (default: 30)
//! * `SIKA_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use interface_api::{config::ApiConfig, create_router, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, builds the application state
/// (ledger, collection store, gateway adapter), and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The gateway HTTP client cannot be built
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = load_config();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting sika-core API Server"
    );

    // Build application state (in-process ledger + gateway adapter)
    let state = AppState::new(config.clone())?;

    // Create the API router
    let app = create_router(state);

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to default values if environment variables are not set.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| {
        // Fall back to individual env vars or defaults
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("SIKA_HOST").unwrap_or(defaults.host),
            port: std::env::var("SIKA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: std::env::var("SIKA_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration_secs: std::env::var("SIKA_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_expiration_secs),
            paystack_secret_key: std::env::var("SIKA_PAYSTACK_SECRET_KEY")
                .unwrap_or(defaults.paystack_secret_key),
            paystack_base_url: std::env::var("SIKA_PAYSTACK_BASE_URL")
                .unwrap_or(defaults.paystack_base_url),
            gateway_timeout_secs: std::env::var("SIKA_GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.gateway_timeout_secs),
            log_level: std::env::var("SIKA_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
