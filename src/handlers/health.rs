//! Health check endpoint
//!
//! Provides a simple health check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Model used for generation
    pub model: String,
    /// Region generated routes are confined to
    pub region: String,
}

/// Health check handler
///
/// Always 200 OK while the process is serving. Does not call the completion
/// API.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let config = state.service().config();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            model: config.model_name().to_string(),
            region: config.bounds().region().to_string(),
        }),
    )
}
