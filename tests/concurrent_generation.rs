//! Concurrent generation calls share one service without coordination

mod common;

use common::*;
use futures::future::join_all;
use motoroute::error::ErrorKind;
use motoroute::metrics::Outcome;
use motoroute::models::{GenerateRouteParams, RouteLength, RoutePriority};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_calls_all_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(warsaw_completion()))
        .expect(10)
        .mount(&server)
        .await;

    let service = Arc::new(service_for(config_for(&server, 0)));
    let calls = (0..10).map(|i| {
        let service = Arc::clone(&service);
        async move {
            let params = GenerateRouteParams::new(
                format!("Start {}", i),
                RoutePriority::ALL[i % 3],
                RouteLength::Distance(100.0 + i as f64),
            )
            .unwrap();
            service.generate_route(&params).await
        }
    });

    let results = join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(service.metrics().generations_count(Outcome::Success), 10);
}

#[tokio::test]
async fn test_failures_do_not_leak_between_calls() {
    let server = MockServer::start().await;
    // Requests starting in Gdańsk get a route on the wrong continent
    Mock::given(method("POST"))
        .and(body_string_contains("Gdańsk"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body(
                &route_json(&[("New York", 40.7128, -74.006), ("Boston", 42.36, -71.06)])
                    .to_string(),
            )),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(warsaw_completion()))
        .mount(&server)
        .await;

    let service = Arc::new(service_for(config_for(&server, 0)));
    let params = |start: &str| {
        GenerateRouteParams::new(start, RoutePriority::Scenic, RouteLength::Duration(2.0)).unwrap()
    };
    let (from_gdansk, from_warsaw) = (params("Gdańsk"), params("Warsaw"));
    let (gdansk, warsaw_a, warsaw_b) = futures::join!(
        service.generate_route(&from_gdansk),
        service.generate_route(&from_warsaw),
        service.generate_route(&from_warsaw),
    );

    assert_eq!(gdansk.unwrap_err().kind(), ErrorKind::OutOfBounds);
    assert!(warsaw_a.is_ok());
    assert!(warsaw_b.is_ok());
    assert_eq!(
        service
            .metrics()
            .generations_count(Outcome::Failed(ErrorKind::OutOfBounds)),
        1
    );
}
