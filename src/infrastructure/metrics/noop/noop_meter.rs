use crate::domain::{Histogram, HistogramPtr, InstrumentDescriptor, Meter};
use axum::http::Extensions;
use metrics::Label;
use std::sync::Arc;

/// No-op meter implementation for testing.
#[derive(Default)]
pub struct NoopMeter;

impl NoopMeter {
    pub fn new() -> Self {
        NoopMeter
    }
}

impl Meter for NoopMeter {
    // ---
    fn histogram(&self, _: &InstrumentDescriptor) -> anyhow::Result<HistogramPtr> {
        Ok(Arc::new(NoopHistogram))
    }
    fn render(&self) -> String {
        String::new()
    }
}

/// Histogram that discards every observation.
pub struct NoopHistogram;

impl Histogram for NoopHistogram {
    fn record(&self, _: &Extensions, _: u64, _: &[Label]) {}
}
