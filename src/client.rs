//! Chat-completion client with bounded exponential-backoff retries
//!
//! One HTTP `POST` is issued per attempt. Non-2xx responses and network
//! failures are retried according to [`RetryPolicy`]; a 2xx response ends the
//! loop and its raw body is handed back for extraction. Nothing that happens
//! after the body is returned (bad JSON, schema, bounds) ever re-enters the
//! loop.

use crate::config::ServiceConfig;
use crate::error::{AppError, AppResult, TransportError};
use crate::metrics::Metrics;
use crate::retry::{RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Header carrying the application name
pub const APP_TITLE_HEADER: &str = "X-Title";
/// Header carrying the application site URL
pub const APP_REFERER_HEADER: &str = "HTTP-Referer";

/// OpenAI-compatible chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Optional error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Build a status error from a non-2xx response body
///
/// Uses `{error: {message, code}}` when present, otherwise a generic message.
pub(crate) fn status_error(status: u16, body: &str) -> TransportError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("completion API error: {}", status));
    let code = envelope.and_then(|e| e.error.code).map(|code| match code {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    TransportError::Status {
        status,
        message,
        code,
    }
}

/// A single attempt against the completion endpoint
///
/// Allows dependency injection of the HTTP layer, enabling tests of the retry
/// state machine without network calls.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send one request; `Ok` carries the raw 2xx response body
    async fn send(&self, request: &ChatCompletionRequest) -> Result<String, TransportError>;
}

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Arc<ServiceConfig>,
}

impl HttpTransport {
    /// Create a transport whose attempts are bounded by `api.request_timeout_seconds`
    pub fn new(config: Arc<ServiceConfig>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<String, TransportError> {
        let mut builder = self
            .client
            .post(self.config.api_url())
            .bearer_auth(self.config.api_key())
            .header(APP_TITLE_HEADER, self.config.app_identifier())
            .json(request);
        if let Some(app_url) = self.config.app_url() {
            builder = builder.header(APP_REFERER_HEADER, app_url);
        }

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout {
                    timeout_seconds: self.config.request_timeout_seconds(),
                }
            } else {
                TransportError::Network {
                    reason: e.to_string(),
                }
            }
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Successful completion call
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Raw 2xx response body
    pub body: String,
    /// Attempts made, including the successful one
    pub attempts: u32,
}

/// Completion client running the retry loop over an injectable transport
pub struct CompletionClient<T = HttpTransport, S = TokioSleeper> {
    config: Arc<ServiceConfig>,
    policy: RetryPolicy,
    transport: T,
    sleeper: S,
    metrics: Option<Arc<Metrics>>,
}

impl CompletionClient {
    /// Create a client that talks HTTP and sleeps on the Tokio timer
    pub fn new(config: Arc<ServiceConfig>) -> AppResult<Self> {
        let transport = HttpTransport::new(config.clone())?;
        Ok(Self::with_transport(config, transport, TokioSleeper))
    }
}

impl<T: CompletionTransport, S: Sleeper> CompletionClient<T, S> {
    pub fn with_transport(config: Arc<ServiceConfig>, transport: T, sleeper: S) -> Self {
        Self {
            policy: RetryPolicy::from_config(&config),
            config,
            transport,
            sleeper,
            metrics: None,
        }
    }

    /// Count attempts and retries in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Assemble the request body for a prompt
    pub fn build_request(&self, system_message: &str, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model_name().to_string(),
            messages: vec![ChatMessage::system(system_message), ChatMessage::user(prompt)],
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
        }
    }

    /// Send the request, retrying transient failures with exponential backoff
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` once a retryable error exhausts the retry budget
    /// - `AppError::Timeout` if a single attempt times out (never retried)
    pub async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<CompletionResponse> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt_index: u32 = 0;

        loop {
            let attempt = attempt_index + 1;
            tracing::debug!(
                attempt = attempt,
                max_attempts = max_attempts,
                model = %request.model,
                "Sending completion request"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_completion_attempt();
            }

            let error = match self.transport.send(request).await {
                Ok(body) => {
                    tracing::debug!(
                        attempt = attempt,
                        response_length = body.len(),
                        "Completion request succeeded"
                    );
                    return Ok(CompletionResponse {
                        body,
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            };

            match self.policy.decide(attempt_index, &error) {
                RetryDecision::Retry { delay } => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Completion attempt failed, retrying after backoff"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_retry();
                    }
                    self.sleeper.sleep(delay).await;
                    attempt_index += 1;
                }
                RetryDecision::GiveUp => {
                    return Err(match error {
                        TransportError::Timeout { timeout_seconds } => {
                            tracing::error!(
                                attempt = attempt,
                                timeout_seconds = timeout_seconds,
                                "Completion attempt timed out"
                            );
                            AppError::Timeout {
                                stage: "completion attempt",
                                timeout_seconds,
                            }
                        }
                        error => {
                            tracing::error!(
                                attempts = attempt,
                                error = %error,
                                "All completion attempts exhausted"
                            );
                            AppError::Transport(error)
                        }
                    });
                }
            }
        }
    }
}
