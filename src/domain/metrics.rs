use axum::http::Extensions;
use metrics::{Label, Unit};
use std::sync::Arc;

/// Static identity of an instrument: name, unit and help text.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentDescriptor {
    pub name: &'static str,
    pub unit: Unit,
    pub description: &'static str,
}

/// Abstraction for a metrics backend able to create instruments.
pub trait Meter: Send + Sync + 'static {
    // ---
    /// Create a histogram instrument bound to `descriptor`.
    ///
    /// Called once at startup; an error here means the service cannot be
    /// instrumented and must not start.
    fn histogram(&self, descriptor: &InstrumentDescriptor) -> anyhow::Result<HistogramPtr>;

    /// Render current metrics in the backend's text format.
    fn render(&self) -> String;
}

/// A histogram instrument shared by every concurrent request.
pub trait Histogram: Send + Sync + 'static {
    /// Record one observation tagged with `attributes`.
    ///
    /// `cx` carries the request extensions so a backend can apply
    /// request-scoped behavior. Failures are the backend's to absorb.
    fn record(&self, cx: &Extensions, value: u64, attributes: &[Label]);
}

/// Type alias for any backend that implements Meter.
pub type MeterPtr = Arc<dyn Meter>;

/// Type alias for any instrument that implements Histogram.
pub type HistogramPtr = Arc<dyn Histogram>;
