//! HTTP request handlers for the motoroute API

use crate::config::ServiceConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::service::RouteGenerationService;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod generate;
pub mod health;
pub mod metrics;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<RouteGenerationService>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails or the service cannot be
    /// built from `config`.
    pub fn new(config: Arc<ServiceConfig>) -> AppResult<Self> {
        let metrics = Arc::new(
            Metrics::new()
                .map_err(|e| AppError::Config(format!("Failed to register metrics: {}", e)))?,
        );
        let service = Arc::new(RouteGenerationService::new(config, metrics.clone())?);
        Ok(Self { service, metrics })
    }

    /// Get reference to the route generation service
    pub fn service(&self) -> &RouteGenerationService {
        &self.service
    }

    /// Get reference to the metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the API router
///
/// - `POST /api/routes/generate`
/// - `GET /health`
/// - `GET /metrics`
///
/// Requests pass the trace layer first, then the request-id middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/routes/generate", post(generate::handler))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}
