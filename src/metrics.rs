//! Prometheus metrics for route generation
//!
//! Tracks:
//! - Generation outcomes (success or error kind)
//! - Completion attempts and retries
//! - End-to-end generation latency
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::error::ErrorKind;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Result of a generation call, used as the `outcome` label
///
/// Failures are labelled with their [`ErrorKind`], so cardinality is bounded
/// by the number of kinds plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(ErrorKind),
}

impl Outcome {
    /// Convert outcome to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failed(kind) => kind.as_str(),
        }
    }
}

/// Metrics collector
///
/// Cloning is cheap and clones share the same registry.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    generations_total: IntCounterVec,
    completion_attempts: IntCounter,
    retries: IntCounter,
    generation_duration: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let generations_total = IntCounterVec::new(
            Opts::new(
                "motoroute_generations_total",
                "Total route generation calls by outcome (success or error kind)",
            ),
            &["outcome"],
        )?;

        let completion_attempts = IntCounter::with_opts(Opts::new(
            "motoroute_completion_attempts_total",
            "Total HTTP attempts against the completion API, including retries",
        ))?;

        let retries = IntCounter::with_opts(Opts::new(
            "motoroute_retries_total",
            "Total completion retries scheduled after a transient failure",
        ))?;

        // Generation is dominated by model latency: seconds, not milliseconds
        let generation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "motoroute_generation_duration_ms",
                "End-to-end route generation latency in milliseconds",
            )
            .buckets(vec![
                100.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 20000.0, 40000.0, 80000.0,
                160000.0, 320000.0,
            ]),
        )?;

        registry.register(Box::new(generations_total.clone()))?;
        registry.register(Box::new(completion_attempts.clone()))?;
        registry.register(Box::new(retries.clone()))?;
        registry.register(Box::new(generation_duration.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            generations_total,
            completion_attempts,
            retries,
            generation_duration,
        })
    }

    /// Record the outcome of one generation call
    pub fn record_generation(&self, outcome: Outcome) {
        self.generations_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Record one HTTP attempt against the completion API
    pub fn record_completion_attempt(&self) {
        self.completion_attempts.inc();
    }

    /// Record a retry scheduled after a transient failure
    pub fn record_retry(&self) {
        self.retries.inc();
    }

    /// Record end-to-end generation duration
    ///
    /// # Errors
    ///
    /// Returns an error if `duration_ms` is NaN, infinite, or negative. Such
    /// values would corrupt every percentile of the histogram.
    pub fn record_generation_duration(&self, duration_ms: f64) -> Result<(), prometheus::Error> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(prometheus::Error::Msg(format!(
                "Histogram value must be finite and non-negative, got: {}",
                duration_ms
            )));
        }
        self.generation_duration.observe(duration_ms);
        Ok(())
    }

    pub fn completion_attempts_count(&self) -> u64 {
        self.completion_attempts.get()
    }

    pub fn retries_count(&self) -> u64 {
        self.retries.get()
    }

    /// Count of generations recorded with `outcome`
    pub fn generations_count(&self, outcome: Outcome) -> u64 {
        self.generations_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    /// Gather all metrics and encode them in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if metric encoding fails.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let metric_count = metric_families.len();

        tracing::debug!(
            metric_family_count = metric_count,
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    metric_family_count = metric_count,
                    "Prometheus text encoder failed"
                );
                prometheus::Error::Msg(format!(
                    "Failed to encode {} metric families: {}",
                    metric_count, e
                ))
            })?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!(
                "Failed to convert metrics to UTF-8 at byte {}: {}",
                e.utf8_error().valid_up_to(),
                e
            ))
        })
    }
}
