//! motoroute - AI-backed motorcycle route generation
//!
//! Asks an OpenAI-compatible chat-completion API for a motorcycle route,
//! retries transient API failures with bounded exponential backoff, and
//! validates the answer's structure and coordinates before returning a
//! [`RouteGenerationResult`](models::RouteGenerationResult).
//!
//! ```no_run
//! use motoroute::config::ServiceConfig;
//! use motoroute::metrics::Metrics;
//! use motoroute::models::{GenerateRouteParams, RouteLength, RoutePriority};
//! use motoroute::service::RouteGenerationService;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ServiceConfig::from_file("config.toml")?);
//! let service = RouteGenerationService::new(config, Arc::new(Metrics::new()?))?;
//!
//! let params = GenerateRouteParams::new("Warsaw", RoutePriority::Scenic, RouteLength::Distance(200.0))?;
//! let route = service.generate_route(&params).await?;
//! println!("{}: {} points", route.title(), route.route_points().len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod geo;
pub mod handlers;
pub mod maps;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod service;
pub mod telemetry;
