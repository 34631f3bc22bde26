//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Meter` trait using
//! the Prometheus metrics format. Each meter owns a `PrometheusRecorder`
//! built in `recorder.rs`; histograms register their labelled series
//! against that recorder directly rather than through the global `metrics`
//! registry, and the meter renders everything it has collected in
//! Prometheus text format.

use crate::domain::{Histogram, HistogramPtr, InstrumentDescriptor, Meter};
use axum::http::Extensions;
use metrics::{Key, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusHandle, PrometheusRecorder};
use std::sync::Arc;

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Prometheus-based meter implementation.
pub struct PrometheusMeter {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl PrometheusMeter {
    pub fn new(recorder: PrometheusRecorder) -> Self {
        tracing::info!("Creating Prometheus meter");
        let handle = recorder.handle();
        PrometheusMeter {
            recorder: Arc::new(recorder),
            handle,
        }
    }
}

impl Meter for PrometheusMeter {
    fn histogram(&self, descriptor: &InstrumentDescriptor) -> anyhow::Result<HistogramPtr> {
        super::validate_metric_name(descriptor.name)?;

        self.recorder.describe_histogram(
            descriptor.name.into(),
            Some(descriptor.unit),
            descriptor.description.into(),
        );

        Ok(Arc::new(PrometheusHistogram {
            recorder: Arc::clone(&self.recorder),
            name: descriptor.name,
        }))
    }

    fn render(&self) -> String {
        self.handle.render()
    }
}

/// Histogram recording into a [`PrometheusMeter`]'s recorder.
///
/// Every distinct attribute set becomes its own labelled series.
pub struct PrometheusHistogram {
    recorder: Arc<PrometheusRecorder>,
    name: &'static str,
}

impl Histogram for PrometheusHistogram {
    fn record(&self, _cx: &Extensions, value: u64, attributes: &[Label]) {
        let key = Key::from_parts(self.name, attributes.to_vec());
        self.recorder
            .register_histogram(&key, &METADATA)
            .record(value as f64);
    }
}
