//! Command-line interface for motoroute
//!
//! Provides argument parsing and subcommand handling for the motoroute binary.

use crate::error::AppResult;
use crate::models::{GenerateRouteParams, RoutePriority};
use clap::{ArgGroup, Parser, Subcommand};

/// Environment variable that overrides `api.api_key`
pub const API_KEY_ENV: &str = "MOTOROUTE_API_KEY";

/// AI-backed motorcycle route generation
#[derive(Parser)]
#[command(name = "motoroute")]
#[command(version)]
#[command(about = "AI-backed motorcycle route generation")]
#[command(
    long_about = "motoroute asks a chat-completion model for a motorcycle route, retries \
    transient API failures with exponential backoff, and validates the answer's structure \
    and coordinates before returning it."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,

    /// Generate a single route and print it
    #[command(group(ArgGroup::new("length").required(true).args(["distance", "duration"])))]
    Generate {
        /// Starting location, e.g. "Warsaw"
        #[arg(short, long)]
        start: String,

        /// Riding style: scenic, twisty or avoid_highways
        #[arg(short, long, default_value = "scenic")]
        priority: RoutePriority,

        /// Approximate route length in kilometers
        #[arg(long)]
        distance: Option<f64>,

        /// Approximate riding time in hours
        #[arg(long)]
        duration: Option<f64>,

        /// Motorcycle type, e.g. "touring" or "sportbike"
        #[arg(short, long)]
        motorcycle_type: Option<String>,

        /// Write the route JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Command {
    /// Parameters for the `generate` subcommand
    ///
    /// Returns `None` for other subcommands.
    pub fn generate_params(&self) -> Option<AppResult<GenerateRouteParams>> {
        match self {
            Command::Generate {
                start,
                priority,
                distance,
                duration,
                motorcycle_type,
                ..
            } => Some(GenerateRouteParams::from_parts(
                start.as_str(),
                *priority,
                motorcycle_type.clone(),
                *distance,
                *duration,
            )),
            _ => None,
        }
    }
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# motoroute configuration
#
# Every section except [api] is optional; the values below are the defaults.

# ─────────────────────────────────────────────────────────────────────────────
# COMPLETION API
# ─────────────────────────────────────────────────────────────────────────────

[api]
# Bearer token for the completion API. Leave empty and set MOTOROUTE_API_KEY
# to keep the secret out of this file.
api_key = "sk-or-replace-me"

# OpenAI-compatible chat completions endpoint
api_url = "https://openrouter.ai/api/v1/chat/completions"

# Model identifier passed through to the provider
model_name = "openai/gpt-4o-mini"

# Sent as X-Title so the provider can attribute traffic
app_identifier = "motoroute"

# Optional site URL, sent as HTTP-Referer
# app_url = "https://example.com"

# Timeout for a single HTTP attempt (never retried)
request_timeout_seconds = 60

# Deadline for the whole call, including retries and backoff
generation_timeout_seconds = 300

# ─────────────────────────────────────────────────────────────────────────────
# RETRIES
# ─────────────────────────────────────────────────────────────────────────────
#
# Non-2xx responses and network failures are retried. The delay before retry k
# is retry_delay_base_ms * 2^(k-1): 1s, 2s, 4s with the defaults.

[retry]
max_retries = 3
retry_delay_base_ms = 1000

# ─────────────────────────────────────────────────────────────────────────────
# SAMPLING
# ─────────────────────────────────────────────────────────────────────────────

[sampling]
max_tokens = 2000
temperature = 0.7

# ─────────────────────────────────────────────────────────────────────────────
# PROMPT
# ─────────────────────────────────────────────────────────────────────────────

[prompt]
# Number of route points to ask for. Answers outside the range are logged
# but still accepted.
min_points = 5
max_points = 10

# ─────────────────────────────────────────────────────────────────────────────
# GEOGRAPHIC BOUNDS
# ─────────────────────────────────────────────────────────────────────────────
#
# Every generated point must lie inside this box (edges included).

[bounds]
region = "Poland"
min_lat = 49.0
max_lat = 55.0
min_lng = 14.0
max_lng = 24.0

# ─────────────────────────────────────────────────────────────────────────────
# HTTP SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
host = "127.0.0.1"
port = 3000

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# trace, debug, info, warn or error (RUST_LOG overrides this)
log_level = "info"
"#
}
