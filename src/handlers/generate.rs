//! Route generation endpoint
//!
//! `POST /api/routes/generate` with a JSON [`GenerateRouteParams`] body.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::models::{GenerateRouteParams, RouteGenerationResult};

/// Successful response envelope
#[derive(Debug, Serialize)]
pub struct GenerateRouteResponse {
    pub success: bool,
    pub data: RouteGenerationResult,
}

/// Generate a route
///
/// Malformed or invalid bodies are answered with 400 before any completion
/// call is made. Generation failures map through `AppError`'s `IntoResponse`.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<GenerateRouteParams>, JsonRejection>,
) -> AppResult<Json<GenerateRouteResponse>> {
    let Json(params) = body.map_err(|rejection| {
        tracing::debug!(
            request_id = %request_id,
            error = %rejection.body_text(),
            "Rejected route generation request"
        );
        AppError::InvalidParams(rejection.body_text())
    })?;

    tracing::info!(
        request_id = %request_id,
        start_point = %params.start_point(),
        route_priority = %params.route_priority(),
        "Generating route"
    );

    let data = state.service().generate_route(&params).await?;

    Ok(Json(GenerateRouteResponse {
        success: true,
        data,
    }))
}
