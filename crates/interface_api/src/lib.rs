//! HTTP API Layer
//!
//! This crate provides the REST API for the payment platform using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for payments and collections
//! - **Middleware**: Authentication, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! The gateway webhook route is registered outside the auth middleware:
//! the gateway cannot carry a bearer token and authenticates each delivery
//! by signing the raw body instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::ApiConfig};
//!
//! let state = AppState::new(ApiConfig::default())?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_collections::CollectionStore;
use domain_payments::adapters::{PaystackConfig, PaystackGateway};
use domain_payments::{GatewayError, GatewayPort, PaymentLedger, ReconciliationEngine};

use crate::config::ApiConfig;
use crate::handlers::{collections, health, payments};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReconciliationEngine>,
    pub ledger: Arc<PaymentLedger>,
    pub collections: Arc<CollectionStore>,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the state with the production Paystack gateway
    pub fn new(config: ApiConfig) -> Result<Self, GatewayError> {
        let gateway = PaystackGateway::new(
            PaystackConfig::new(config.paystack_secret_key.clone())
                .with_base_url(config.paystack_base_url.clone())
                .with_timeout(std::time::Duration::from_secs(config.gateway_timeout_secs)),
        )?;
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    /// Builds the state with an injected gateway (tests, alternative adapters)
    pub fn with_gateway(config: ApiConfig, gateway: Arc<dyn GatewayPort>) -> Self {
        let ledger = Arc::new(PaymentLedger::new());
        let collections = Arc::new(CollectionStore::new());
        let engine = Arc::new(ReconciliationEngine::new(
            ledger.clone(),
            gateway,
            collections.clone(),
        ));

        Self {
            engine,
            ledger,
            collections,
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth; the webhook authenticates via body signature)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/v1/payments/webhook", post(payments::gateway_webhook));

    // Payment routes
    let payment_routes = Router::new()
        .route("/initialize", post(payments::initialize_payment))
        .route("/mobile-money", post(payments::mobile_money_payment))
        .route("/verify/:reference", get(payments::verify_payment))
        .route("/stats", get(payments::payment_stats))
        .route("/", get(payments::list_payments))
        .route("/:reference", get(payments::get_payment));

    // Collection routes
    let collection_routes = Router::new()
        .route("/", post(collections::create_collection))
        .route("/", get(collections::list_collections))
        .route("/:id", get(collections::get_collection));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .nest("/collections", collection_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
