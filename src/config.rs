//! Configuration management for motoroute
//!
//! Parses TOML configuration files and provides typed access to settings.
//! A [`ServiceConfig`] is validated once, when it is constructed, and then
//! shared read-only (usually behind an `Arc`) by every generation call.

use crate::error::{AppError, AppResult};
use crate::geo::BoundingBox;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for any configured timeout, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 600;
/// Upper bound for `retry.max_retries`
const MAX_RETRIES_LIMIT: u32 = 10;

/// Root configuration structure
///
/// Sections that concern the generation pipeline are private and exposed via
/// accessors so a validated config cannot be mutated afterwards.
///
/// Not `Serialize`: the API key is never written back out.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    api: ApiConfig,
    #[serde(default)]
    retry: RetryConfig,
    #[serde(default)]
    sampling: SamplingConfig,
    #[serde(default)]
    prompt: PromptConfig,
    #[serde(default)]
    bounds: BoundingBox,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Completion API connection settings
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    api_url: String,
    #[serde(default)]
    model_name: String,
    /// Sent as the `X-Title` header so the provider can attribute traffic
    #[serde(default)]
    app_identifier: String,
    /// Optional site URL, sent as `HTTP-Referer`
    #[serde(default)]
    app_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    request_timeout_seconds: u64,
    #[serde(default = "default_generation_timeout")]
    generation_timeout_seconds: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .field("app_identifier", &self.app_identifier)
            .field("app_url", &self.app_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("generation_timeout_seconds", &self.generation_timeout_seconds)
            .finish()
    }
}

fn default_request_timeout() -> u64 {
    60
}

fn default_generation_timeout() -> u64 {
    300
}

/// Retry settings for the completion call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (total attempts = max_retries + 1)
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    /// Base backoff in milliseconds (doubles each retry)
    #[serde(default = "default_retry_delay_base_ms")]
    retry_delay_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_base_ms: default_retry_delay_base_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_base_ms() -> u64 {
    1000
}

/// Sampling parameters forwarded to the model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_temperature")]
    temperature: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f64 {
    0.7
}

/// How many points the model is asked to produce
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
    #[serde(default = "default_min_points")]
    min_points: usize,
    #[serde(default = "default_max_points")]
    max_points: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            min_points: default_min_points(),
            max_points: default_max_points(),
        }
    }
}

fn default_min_points() -> usize {
    5
}

fn default_max_points() -> usize {
    10
}

/// HTTP server configuration (used by `motoroute serve`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Address `motoroute serve` binds to
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` is not an IP address.
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let ip = self.host.parse::<IpAddr>().map_err(|e| {
            AppError::Config(format!(
                "server.host must be an IP address, got '{}': {}",
                self.host, e
            ))
        })?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Start building a config in code with the four required settings
    ///
    /// Every other field starts at its documented default.
    pub fn builder(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model_name: impl Into<String>,
        app_identifier: impl Into<String>,
    ) -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: ServiceConfig {
                api: ApiConfig {
                    api_key: api_key.into(),
                    api_url: api_url.into(),
                    model_name: model_name.into(),
                    app_identifier: app_identifier.into(),
                    app_url: None,
                    request_timeout_seconds: default_request_timeout(),
                    generation_timeout_seconds: default_generation_timeout(),
                },
                retry: RetryConfig::default(),
                sampling: SamplingConfig::default(),
                prompt: PromptConfig::default(),
                bounds: BoundingBox::default(),
                server: ServerConfig::default(),
                observability: ObservabilityConfig::default(),
            },
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        Self::from_file_with_api_key(path, None)
    }

    /// Load configuration from a TOML file, replacing the API key if one is given
    ///
    /// The override is applied before validation, so the file may leave
    /// `api.api_key` empty when the key comes from the environment.
    pub fn from_file_with_api_key<P: AsRef<Path>>(
        path: P,
        api_key: Option<String>,
    ) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let mut config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;
        if let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) {
            config.api.api_key = api_key;
        }

        // Phase 3: Validate parsed config
        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Replace the API key, re-validating the result
    ///
    /// Lets deployments keep the secret out of the config file.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> AppResult<Self> {
        self.api.api_key = api_key.into();
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("api.api_key", &self.api.api_key),
            ("api.api_url", &self.api.api_url),
            ("api.model_name", &self.api.model_name),
            ("api.app_identifier", &self.api.app_identifier),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} is required", field)));
            }
        }

        if !self.api.api_url.starts_with("http://") && !self.api.api_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "api.api_url must start with http:// or https://, got '{}'",
                self.api.api_url
            )));
        }

        if let Some(app_url) = &self.api.app_url
            && app_url.trim().is_empty()
        {
            return Err(AppError::Config(
                "api.app_url cannot be empty when set".to_string(),
            ));
        }

        for (field, timeout) in [
            ("api.request_timeout_seconds", self.api.request_timeout_seconds),
            (
                "api.generation_timeout_seconds",
                self.api.generation_timeout_seconds,
            ),
        ] {
            if timeout == 0 {
                return Err(AppError::Config(format!(
                    "{} must be greater than 0",
                    field
                )));
            }
            if timeout > MAX_TIMEOUT_SECONDS {
                return Err(AppError::Config(format!(
                    "{} cannot exceed {} seconds, got {}",
                    field, MAX_TIMEOUT_SECONDS, timeout
                )));
            }
        }

        if self.retry.max_retries > MAX_RETRIES_LIMIT {
            return Err(AppError::Config(format!(
                "retry.max_retries cannot exceed {}, got {}",
                MAX_RETRIES_LIMIT, self.retry.max_retries
            )));
        }

        if self.sampling.max_tokens == 0 {
            return Err(AppError::Config(
                "sampling.max_tokens must be greater than 0".to_string(),
            ));
        }
        let temperature = self.sampling.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!(
                "sampling.temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        if self.prompt.min_points == 0 || self.prompt.min_points > self.prompt.max_points {
            return Err(AppError::Config(format!(
                "prompt point range must satisfy 1 <= min_points <= max_points, got {}..{}",
                self.prompt.min_points, self.prompt.max_points
            )));
        }

        // Bounding box is validated when it is deserialized or constructed.

        Ok(())
    }

    pub fn api_key(&self) -> &str {
        &self.api.api_key
    }

    pub fn api_url(&self) -> &str {
        &self.api.api_url
    }

    pub fn model_name(&self) -> &str {
        &self.api.model_name
    }

    pub fn app_identifier(&self) -> &str {
        &self.api.app_identifier
    }

    pub fn app_url(&self) -> Option<&str> {
        self.api.app_url.as_deref()
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.api.request_timeout_seconds
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_seconds)
    }

    pub fn generation_timeout_seconds(&self) -> u64 {
        self.api.generation_timeout_seconds
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.api.generation_timeout_seconds)
    }

    pub fn max_retries(&self) -> u32 {
        self.retry.max_retries
    }

    pub fn retry_delay_base_ms(&self) -> u64 {
        self.retry.retry_delay_base_ms
    }

    pub fn max_tokens(&self) -> u32 {
        self.sampling.max_tokens
    }

    pub fn temperature(&self) -> f64 {
        self.sampling.temperature
    }

    pub fn min_points(&self) -> usize {
        self.prompt.min_points
    }

    pub fn max_points(&self) -> usize {
        self.prompt.max_points
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

impl FromStr for ServiceConfig {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: ServiceConfig =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        // Validate config before returning
        config.validate()?;
        Ok(config)
    }
}

/// Programmatic construction of a [`ServiceConfig`]
///
/// `build()` runs the same validation as file loading.
#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn app_url(mut self, app_url: impl Into<String>) -> Self {
        self.config.api.app_url = Some(app_url.into());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    pub fn retry_delay_base_ms(mut self, retry_delay_base_ms: u64) -> Self {
        self.config.retry.retry_delay_base_ms = retry_delay_base_ms;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.sampling.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.sampling.temperature = temperature;
        self
    }

    pub fn request_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.api.request_timeout_seconds = seconds;
        self
    }

    pub fn generation_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.api.generation_timeout_seconds = seconds;
        self
    }

    pub fn point_range(mut self, min_points: usize, max_points: usize) -> Self {
        self.config.prompt = PromptConfig {
            min_points,
            max_points,
        };
        self
    }

    pub fn bounds(mut self, bounds: BoundingBox) -> Self {
        self.config.bounds = bounds;
        self
    }

    pub fn build(self) -> AppResult<ServiceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
