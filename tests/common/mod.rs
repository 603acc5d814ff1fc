//! Shared fixtures for integration tests

#![allow(dead_code)]

use motoroute::config::ServiceConfig;
use motoroute::metrics::Metrics;
use motoroute::service::RouteGenerationService;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";
pub const TEST_API_KEY: &str = "sk-test-key";
pub const TEST_APP: &str = "10xBikeTravels";

/// Five points heading south-east from Warsaw, all inside Poland
pub const WARSAW_POINTS: [(&str, f64, f64); 5] = [
    ("Warsaw", 52.2321, 21.0063),
    ("Garwolin", 51.9628, 21.2158),
    ("Dęblin", 51.5849, 21.5451),
    ("Kurów", 51.3248, 21.9499),
    ("Lublin", 51.2867, 22.2178),
];

/// Route JSON as a model would write it
pub fn route_json(points: &[(&str, f64, f64)]) -> Value {
    json!({
        "title": "Vistula and Wieprz Valleys",
        "summary": "Quiet roads south-east of the capital",
        "routePoints": points
            .iter()
            .map(|(name, lat, lng)| json!({
                "name": name,
                "description": format!("Ride through {}", name),
                "coordinates": {"lat": lat, "lng": lng}
            }))
            .collect::<Vec<_>>()
    })
}

/// Chat-completion envelope carrying `content`
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "gen-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": content}
        }]
    })
}

pub fn warsaw_completion() -> Value {
    completion_body(&route_json(&WARSAW_POINTS).to_string())
}

pub fn rate_limit_body() -> Value {
    json!({"error": {"message": "Rate limit exceeded", "code": "rate_limit_exceeded"}})
}

/// Config pointing at the mock server with fast retries
pub fn config_for(server: &MockServer, max_retries: u32) -> Arc<ServiceConfig> {
    Arc::new(
        ServiceConfig::builder(
            TEST_API_KEY,
            format!("{}{}", server.uri(), COMPLETIONS_PATH),
            "openai/gpt-4o-mini",
            TEST_APP,
        )
        .app_url("https://10xbiketravels.com")
        .max_retries(max_retries)
        .retry_delay_base_ms(5)
        .build()
        .expect("valid test config"),
    )
}

pub fn service_for(config: Arc<ServiceConfig>) -> RouteGenerationService {
    let metrics = Arc::new(Metrics::new().expect("should create Metrics"));
    RouteGenerationService::new(config, metrics).expect("should create service")
}
