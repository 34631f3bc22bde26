use anyhow::{bail, Context};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};
use once_cell::sync::Lazy;
use regex::Regex;

static METRIC_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("metric name pattern is valid"));

/// Build a standalone Prometheus recorder exporting histograms with the
/// given bucket boundaries.
pub fn build_recorder(buckets_ms: &[f64]) -> anyhow::Result<PrometheusRecorder> {
    let recorder = PrometheusBuilder::new()
        .set_buckets(buckets_ms)
        .context("invalid histogram buckets")?
        .build_recorder();

    Ok(recorder)
}

/// Reject names the Prometheus exposition format cannot carry.
pub fn validate_metric_name(name: &str) -> anyhow::Result<()> {
    if !METRIC_NAME.is_match(name) {
        bail!("invalid Prometheus metric name: {name:?}");
    }
    Ok(())
}
