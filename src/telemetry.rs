//! Structured logging setup
//!
//! Configures tracing-subscriber with an `EnvFilter` and the fmt layer.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Default filter directive for a configured level
///
/// Our own crate logs at `level`; tower-http request traces stay at debug.
pub fn default_directive(level: &str) -> String {
    format!("motoroute={},tower_http=debug", level)
}

/// Initialize tracing subscriber for structured logging
///
/// Only the first call per process has any effect. `RUST_LOG` takes
/// precedence over `default_level` when set.
///
/// # Examples
///
/// ```no_run
/// motoroute::telemetry::init("info");
/// tracing::info!("Application started");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
