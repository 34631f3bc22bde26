mod prometheus_meter;
mod recorder;

pub use prometheus_meter::{PrometheusHistogram, PrometheusMeter};
use std::sync::Arc;

// Re-export utilities for internal use within this module
pub(crate) use recorder::{build_recorder, validate_metric_name};

/// Default histogram bucket boundaries, in milliseconds.
pub const DEFAULT_BUCKETS_MS: &[f64] = &[
    5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

/// Creates a new Prometheus metrics implementation.
///
/// The meter owns its recorder instead of installing a global one, so
/// several meters can coexist in one process. Histograms are exported with
/// `buckets_ms` as their bucket boundaries.
///
/// Returns a fully initialized meter ready for use.
pub fn create(buckets_ms: &[f64]) -> anyhow::Result<crate::domain::MeterPtr> {
    tracing::info!(buckets = buckets_ms.len(), "Initializing Prometheus metrics");
    let recorder = build_recorder(buckets_ms)?;

    Ok(Arc::new(PrometheusMeter::new(recorder)))
}
