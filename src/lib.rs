// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{body::Bytes, extract::MatchedPath, http::Request, routing::get, Router};
use metrics::Label;

use domain::{Handler, MeterPtr};
use handlers::{metrics_handler, Health, NotFound, Root, Sleep, Status};
use infrastructure::http::HandlerService;

// Public exports (visible outside this module)
pub mod domain;
pub mod infrastructure;
pub mod middleware;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;

pub use config::*;

pub use middleware::{
    Instrumented, Outcome, RequestDuration, RequestDurationConfig, METRIC_NAME, OUTCOME_KEY,
};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_metrics, // ---
    create_noop_metrics,
    create_prom_metrics,
};

/// Build the metrics backend selected by `config`.
pub fn create_meter(config: &MetricsConfig) -> Result<MeterPtr> {
    // ---
    match config.backend {
        MetricsBackend::Prometheus => create_prom_metrics(&config.buckets_ms),
        MetricsBackend::Memory => create_memory_metrics(),
        MetricsBackend::Noop => create_noop_metrics(),
    }
}

/// Base attributes of the demo server: `method`, `route` and `service`.
///
/// `route` is the matched route template (`/status/{code}`), so the label
/// cardinality stays bounded; requests no route matched get `unmatched`.
pub fn request_attributes(
    service: String,
) -> impl Fn(&Request<Bytes>) -> Result<Vec<Label>> + Send + Sync + 'static {
    // ---
    move |req| {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_owned())
            .unwrap_or_else(|| "unmatched".to_owned());

        Ok(vec![
            Label::new("method", req.method().to_string()),
            Label::new("route", route),
            Label::new("service", service.clone()),
        ])
    }
}

/// Build the HTTP router with the metrics backend determined by environment variables.
pub fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;
    let meter = create_meter(&config.metrics)?;

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    create_router_with(&config, meter)
}

/// Build the HTTP router recording into `meter`.
///
/// # Errors
/// Fails if the request-duration histogram cannot be created; the server
/// must not start uninstrumented.
pub fn create_router_with(config: &AppConfig, meter: MeterPtr) -> Result<Router> {
    // ---
    let duration = RequestDuration::new(
        RequestDurationConfig::builder()
            .meter(meter.clone())
            .attributes(request_attributes(config.server.service_name.clone()))
            .pool_max_idle(config.metrics.pool_max_idle)
            .build()?,
    )?;

    let limit = config.server.max_body_bytes;
    let router = Router::new()
        .route_service("/", instrument(&duration, Root, limit))
        .route_service("/health", instrument(&duration, Health, limit))
        .route_service("/status/{code}", instrument(&duration, Status, limit))
        .route_service("/sleep/{millis}", instrument(&duration, Sleep, limit))
        .route("/metrics", get(metrics_handler))
        .fallback_service(instrument(&duration, NotFound, limit))
        .with_state(AppState::new(meter));

    Ok(router)
}

fn instrument<H: Handler>(
    duration: &RequestDuration,
    handler: H,
    max_body_bytes: usize,
) -> HandlerService<Instrumented<H>> {
    // ---
    HandlerService::new(duration.wrap(handler)).max_body_bytes(max_body_bytes)
}
