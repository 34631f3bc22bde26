// Test helpers are intentionally partially used
#![allow(dead_code)]

use request_duration::domain::MeterPtr;
use request_duration::infrastructure::metrics::memory::{InMemoryMeter, Recording};
use request_duration::{create_router_with, AppConfig, MetricsConfig, ServerConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

// ============================================================================
// Test Setup
// ============================================================================

/// Configuration used by every test server; nothing is read from the environment.
pub fn test_config() -> AppConfig {
    // ---
    AppConfig {
        server: ServerConfig {
            service_name: "test-service".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            max_body_bytes: 1024,
        },
        metrics: MetricsConfig {
            backend: request_duration::MetricsBackend::Memory,
            buckets_ms: vec![10.0, 100.0, 1000.0],
            pool_max_idle: 16,
        },
    }
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(meter: MeterPtr) -> Self {
        // --

        let app =
            create_router_with(&test_config(), meter).expect("Should be able to create router");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    /// Start a server recording into a fresh in-memory meter.
    pub async fn with_memory_meter() -> (Self, Arc<InMemoryMeter>) {
        // ---
        let meter = InMemoryMeter::new();
        let server = Self::new(meter.clone()).await;
        (server, meter)
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}

/// Value of attribute `key` on `recording`, if present.
pub fn attribute<'a>(recording: &'a Recording, key: &str) -> Option<&'a str> {
    // ---
    recording
        .attributes
        .iter()
        .find(|l| l.key() == key)
        .map(|l| l.value())
}
