use anyhow::{ensure, Result};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{attribute, test_config, TestServer};
use request_duration::create_router_with;
use request_duration::infrastructure::metrics::memory::InMemoryMeter;
use std::time::{Duration, Instant};
use tower::ServiceExt;

mod common;

#[tokio::test]
#[serial_test::serial]
async fn router_from_environment() {
    // ---
    std::env::set_var("REQDUR_SERVICE_NAME", "env-service");
    std::env::set_var("REQDUR_METRICS_TYPE", "memory");

    let router = request_duration::create_router().expect("Should be able to create router");
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    std::env::remove_var("REQDUR_METRICS_TYPE");
    std::env::remove_var("REQDUR_SERVICE_NAME");
}

#[tokio::test]
async fn basic_integration_test() {
    // ---
    // Test that the router can be created successfully
    let _router = create_router_with(&test_config(), InMemoryMeter::new())
        .expect("Should be able to create router");
}

#[tokio::test]
async fn root_endpoint_records_implicit_success() -> Result<()> {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let response = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body = response.text().await?;
    ensure!(body.contains("request_duration_millis"));

    let recordings = meter.recordings();
    assert_eq!(recordings.len(), 1);
    let recording = &recordings[0];
    assert_eq!(recording.name, "request_duration_millis");
    assert_eq!(attribute(recording, "outcome"), Some("success"));
    assert_eq!(attribute(recording, "method"), Some("GET"));
    assert_eq!(attribute(recording, "route"), Some("/"));
    assert_eq!(attribute(recording, "service"), Some("test-service"));
    assert_eq!(recording.attributes.len(), 4);
    Ok(())
}

#[tokio::test]
async fn not_found_status_records_failure() {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let response = server
        .client
        .get(server.url("/status/404"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let recordings = meter.recordings();
    assert_eq!(recordings.len(), 1);
    assert_eq!(attribute(&recordings[0], "outcome"), Some("failure"));
    assert_eq!(attribute(&recordings[0], "route"), Some("/status/{code}"));
}

#[tokio::test]
async fn redirect_status_records_success() {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let response = server
        .client
        .get(server.url("/status/304"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 304);
    assert_eq!(attribute(&meter.recordings()[0], "outcome"), Some("success"));
}

#[tokio::test]
async fn slow_handler_duration_is_recorded() {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let start = Instant::now();
    let response = server
        .client
        .get(server.url("/sleep/50"))
        .send()
        .await
        .expect("Failed to send request");
    let round_trip = start.elapsed();

    assert_eq!(response.status(), 200);

    let recordings = meter.recordings();
    assert_eq!(recordings.len(), 1);
    assert!(recordings[0].value >= 50, "got {}ms", recordings[0].value);
    assert!(Duration::from_millis(recordings[0].value) <= round_trip);
    assert_eq!(attribute(&recordings[0], "outcome"), Some("success"));
}

#[tokio::test]
async fn unknown_route_is_measured_as_unmatched() {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let response = server
        .client
        .get(server.url("/nonexistent"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let recordings = meter.recordings();
    assert_eq!(recordings.len(), 1);
    assert_eq!(attribute(&recordings[0], "route"), Some("unmatched"));
    assert_eq!(attribute(&recordings[0], "outcome"), Some("failure"));
}

#[tokio::test]
async fn metrics_endpoint_is_not_measured() {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(meter.recordings().is_empty());
}

#[tokio::test]
async fn server_handles_concurrent_requests() {
    // ---
    let (server, meter) = TestServer::with_memory_meter().await;

    let codes: Vec<u16> = (0..20)
        .map(|_| if rand::random::<bool>() { 200 } else { 503 })
        .collect();

    let futures = codes
        .iter()
        .map(|code| server.client.get(server.url(&format!("/status/{code}"))).send());
    let responses = futures::future::join_all(futures).await;

    for (response, code) in responses.into_iter().zip(&codes) {
        let response = response.expect("Request should succeed");
        assert_eq!(response.status().as_u16(), *code);
    }

    let recordings = meter.recordings();
    assert_eq!(recordings.len(), codes.len());

    let failures = recordings
        .iter()
        .filter(|r| attribute(r, "outcome") == Some("failure"))
        .count();
    assert_eq!(failures, codes.iter().filter(|c| **c >= 400).count());

    for recording in &recordings {
        let outcomes = recording
            .attributes
            .iter()
            .filter(|l| l.key() == "outcome")
            .count();
        assert_eq!(outcomes, 1);
    }
}

#[tokio::test]
async fn oversized_body_is_rejected_before_handler() {
    // ---
    let meter = InMemoryMeter::new();
    let router = create_router_with(&test_config(), meter.clone()).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/health")
        .body(Body::from(vec![b'x'; 4096]))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    // The body limit is enforced by the service before the instrumented handler runs.
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(meter.recordings().is_empty());
}

#[tokio::test]
async fn instrumentation_does_not_change_response() {
    // ---
    let meter = InMemoryMeter::new();
    let router = create_router_with(&test_config(), meter.clone()).unwrap();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"status":"ok"}"#);

    assert_eq!(meter.recordings().len(), 1);
}

#[tokio::test]
async fn invalid_status_parameter_is_client_error() {
    // ---
    let meter = InMemoryMeter::new();
    let router = create_router_with(&test_config(), meter.clone()).unwrap();

    let request = Request::builder()
        .uri("/status/teapot")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(attribute(&meter.recordings()[0], "outcome"), Some("failure"));
}
