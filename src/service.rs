//! Route generation pipeline
//!
//! build prompt → completion (retry loop) → extract content → parse JSON →
//! validate schema → validate bounds.
//!
//! Only the completion stage retries. Every later stage is terminal on its
//! first failure and is reported with its own [`ErrorKind`](crate::error::ErrorKind).

use crate::client::{CompletionClient, CompletionTransport, HttpTransport};
use crate::config::ServiceConfig;
use crate::error::{AppError, AppResult};
use crate::extract::{extract_content, parse_route_json};
use crate::geo::validate_bounds;
use crate::metrics::{Metrics, Outcome};
use crate::models::{GenerateRouteParams, RouteGenerationResult};
use crate::prompt::PromptBuilder;
use crate::retry::{Sleeper, TokioSleeper};
use crate::schema::validate_route;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Turn a raw 2xx completion body into a validated route
///
/// Pure and synchronous: extraction, JSON parsing, schema and bounds checks.
pub fn process_completion(body: &str, config: &ServiceConfig) -> AppResult<RouteGenerationResult> {
    let content = extract_content(body)?;
    let value = parse_route_json(&content)?;
    let result = validate_route(&value, config.min_points(), config.max_points())?;
    validate_bounds(&result, config.bounds())?;
    Ok(result)
}

/// Generates motorcycle routes through a chat-completion API
///
/// Holds only immutable state; share it behind an `Arc` and call it
/// concurrently.
pub struct RouteGenerationService<T = HttpTransport, S = TokioSleeper> {
    config: Arc<ServiceConfig>,
    prompts: PromptBuilder,
    client: CompletionClient<T, S>,
    metrics: Arc<Metrics>,
}

impl RouteGenerationService {
    /// Create a service that calls the configured API over HTTP
    ///
    /// `config` was validated when it was built and is not checked again.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: Arc<ServiceConfig>, metrics: Arc<Metrics>) -> AppResult<Self> {
        let client = CompletionClient::new(config.clone())?;
        Ok(Self::with_client(config, client, metrics))
    }
}

impl<T: CompletionTransport, S: Sleeper> RouteGenerationService<T, S> {
    /// Create a service around an existing completion client
    pub fn with_client(
        config: Arc<ServiceConfig>,
        client: CompletionClient<T, S>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            prompts: PromptBuilder::from_config(&config),
            client: client.with_metrics(metrics.clone()),
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Generate a route for `params`
    ///
    /// The whole call, including retries and backoff sleeps, is bounded by
    /// `api.generation_timeout_seconds`.
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` after the retry budget is exhausted
    /// - `AppError::Timeout` when an attempt or the whole call times out
    /// - `AppError::NoContent`, `JsonParse`, `RouteFormat` or `OutOfBounds`
    ///   when the model output is unusable
    pub async fn generate_route(
        &self,
        params: &GenerateRouteParams,
    ) -> AppResult<RouteGenerationResult> {
        self.generate_route_until(params, std::future::pending::<()>())
            .await
    }

    /// Like [`generate_route`](Self::generate_route), but gives up with
    /// `AppError::Cancelled` as soon as `cancel` completes
    pub async fn generate_route_until<F>(
        &self,
        params: &GenerateRouteParams,
        cancel: F,
    ) -> AppResult<RouteGenerationResult>
    where
        F: Future<Output = ()>,
    {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate_route", request_id = %request_id);
        let started = Instant::now();
        let deadline = self.config.generation_timeout();

        let result = async {
            tokio::select! {
                biased;
                _ = cancel => {
                    tracing::warn!("Route generation cancelled by caller");
                    Err(AppError::Cancelled)
                }
                outcome = tokio::time::timeout(deadline, self.run_pipeline(params)) => {
                    outcome.unwrap_or_else(|_| {
                        Err(AppError::Timeout {
                            stage: "generation",
                            timeout_seconds: self.config.generation_timeout_seconds(),
                        })
                    })
                }
            }
        }
        .instrument(span.clone())
        .await;

        let _entered = span.enter();
        self.record_outcome(&result, started);
        result
    }

    async fn run_pipeline(&self, params: &GenerateRouteParams) -> AppResult<RouteGenerationResult> {
        let prompt = self.prompts.build(params);
        tracing::debug!(
            start_point = %params.start_point(),
            route_priority = %params.route_priority(),
            prompt_length = prompt.len(),
            "Built route prompt"
        );

        let request = self
            .client
            .build_request(&self.prompts.system_message(), &prompt);
        let response = self.client.complete(&request).await?;
        let result = process_completion(&response.body, &self.config)?;

        tracing::info!(
            title = %result.title(),
            point_count = result.route_points().len(),
            attempts = response.attempts,
            "Route generated"
        );
        Ok(result)
    }

    fn record_outcome(&self, result: &AppResult<RouteGenerationResult>, started: Instant) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let outcome = match result {
            Ok(_) => Outcome::Success,
            Err(e) => {
                tracing::warn!(
                    kind = %e.kind(),
                    error = %e,
                    elapsed_ms = elapsed_ms,
                    "Route generation failed"
                );
                Outcome::Failed(e.kind())
            }
        };

        self.metrics.record_generation(outcome);
        // Metrics are non-critical; never fail the call over them
        if let Err(e) = self.metrics.record_generation_duration(elapsed_ms) {
            tracing::warn!(error = %e, "Failed to record generation duration");
        }
    }
}
