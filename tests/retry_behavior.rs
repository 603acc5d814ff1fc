//! Integration tests for the completion retry loop
//!
//! Verifies against a mock HTTP server that:
//! - Non-2xx responses are retried up to `max_retries` times
//! - A success after a failure ends the loop
//! - Backoff delays double from the configured base
//! - Attempt timeouts are terminal and never retried

mod common;

use async_trait::async_trait;
use common::*;
use motoroute::client::{CompletionClient, HttpTransport};
use motoroute::error::{AppError, ErrorKind, TransportError};
use motoroute::metrics::Metrics;
use motoroute::models::{GenerateRouteParams, RouteLength, RoutePriority};
use motoroute::retry::Sleeper;
use motoroute::service::RouteGenerationService;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params() -> GenerateRouteParams {
    GenerateRouteParams::new("Warsaw", RoutePriority::Scenic, RouteLength::Distance(200.0))
        .expect("valid params")
}

/// Records requested delays instead of sleeping
#[derive(Clone, Default)]
struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

#[tokio::test]
async fn test_rate_limited_every_attempt_gives_up_after_one_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(rate_limit_body()))
        .expect(2)
        .mount(&server)
        .await;

    let service = service_for(config_for(&server, 1));
    let err = service.generate_route(&params()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().starts_with("Failed to generate route:"));
    match err {
        AppError::Transport(TransportError::Status {
            status,
            message,
            code,
        }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit exceeded");
            assert_eq!(code.as_deref(), Some("rate_limit_exceeded"));
        }
        other => panic!("expected Transport status error, got {:?}", other),
    }
    assert_eq!(service.metrics().completion_attempts_count(), 2);
    assert_eq!(service.metrics().retries_count(), 1);
}

#[tokio::test]
async fn test_server_error_then_success_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(warsaw_completion()))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(config_for(&server, 3));
    let route = service
        .generate_route(&params())
        .await
        .expect("second attempt should succeed");

    assert_eq!(route.route_points().len(), 5);
    assert_eq!(service.metrics().retries_count(), 1);
}

#[tokio::test]
async fn test_attempts_never_exceed_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let err = service_for(config_for(&server, 3))
        .generate_route(&params())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Transport(TransportError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_zero_retries_makes_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = service_for(config_for(&server, 0))
        .generate_route(&params())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_backoff_delays_double_from_base() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let config = Arc::new(
        motoroute::config::ServiceConfig::builder(
            TEST_API_KEY,
            format!("{}{}", server.uri(), COMPLETIONS_PATH),
            "test-model",
            TEST_APP,
        )
        .max_retries(3)
        .retry_delay_base_ms(1000)
        .build()
        .unwrap(),
    );
    let sleeper = RecordingSleeper::default();
    let client = CompletionClient::with_transport(
        config.clone(),
        HttpTransport::new(config.clone()).unwrap(),
        sleeper.clone(),
    );
    let service =
        RouteGenerationService::with_client(config, client, Arc::new(Metrics::new().unwrap()));

    let err = service.generate_route(&params()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(
        *sleeper.delays.lock().unwrap(),
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
        ]
    );
}

#[tokio::test]
async fn test_attempt_timeout_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(warsaw_completion())
                .set_delay(Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = Arc::new(
        motoroute::config::ServiceConfig::builder(
            TEST_API_KEY,
            format!("{}{}", server.uri(), COMPLETIONS_PATH),
            "test-model",
            TEST_APP,
        )
        .max_retries(3)
        .request_timeout_seconds(1)
        .build()
        .unwrap(),
    );

    let err = service_for(config).generate_route(&params()).await.unwrap_err();
    assert!(
        matches!(err, AppError::Timeout { timeout_seconds: 1, .. }),
        "expected attempt timeout, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_whole_call_deadline_bounds_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // First backoff alone (5s) outlasts the 1s generation deadline
    let config = Arc::new(
        motoroute::config::ServiceConfig::builder(
            TEST_API_KEY,
            format!("{}{}", server.uri(), COMPLETIONS_PATH),
            "test-model",
            TEST_APP,
        )
        .max_retries(3)
        .retry_delay_base_ms(5000)
        .generation_timeout_seconds(1)
        .build()
        .unwrap(),
    );

    let err = service_for(config).generate_route(&params()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Timeout {
            stage: "generation",
            timeout_seconds: 1
        }
    ));
}
