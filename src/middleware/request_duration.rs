//! Request-duration histogram middleware.
//!
//! [`RequestDuration`] creates its histogram once at construction and then
//! wraps handlers with [`RequestDuration::wrap`]. For every request the
//! wrapped handler runs against a [`RecordingResponseWriter`]; once it
//! returns, the elapsed whole milliseconds are recorded together with the
//! base attributes and a single `outcome` attribute derived from the
//! captured status. A request that does not run to completion (its future
//! dropped, or its handler panicking) is recorded as a `failure`.

use super::recording_writer::{RecorderPool, RecorderState, RecordingResponseWriter};
use super::Error;
use crate::domain::{Handler, HistogramPtr, InstrumentDescriptor, MeterPtr, ResponseWriter};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Request, StatusCode};
use metrics::{Label, Unit};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const METRIC_NAME: &str = "request_duration_millis";
pub const METRIC_DESCRIPTION: &str =
    "Measures the latency of HTTP requests processed by the server, in milliseconds.";
pub const OUTCOME_KEY: &str = "outcome";

/// Default number of idle recorder states kept for reuse.
pub const DEFAULT_POOL_MAX_IDLE: usize = 256;

/// Descriptor of the histogram every [`RequestDuration`] creates.
pub fn descriptor() -> InstrumentDescriptor {
    // ---
    InstrumentDescriptor {
        name: METRIC_NAME,
        unit: Unit::Milliseconds,
        description: METRIC_DESCRIPTION,
    }
}

/// Derives the base attributes of a request. Runs on every request.
pub type AttributesFn = Arc<dyn Fn(&Request<Bytes>) -> anyhow::Result<Vec<Label>> + Send + Sync>;

/// Success/failure classification of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    // ---
    /// Classify a captured status.
    ///
    /// Client and server errors (400 and above) are failures. Everything
    /// else is a success, including redirects and the case where the handler
    /// sent no status at all (the server then answers `200 OK`).
    pub fn from_status(status: Option<StatusCode>) -> Self {
        // ---
        match status {
            Some(status) if status.as_u16() >= 400 => Outcome::Failure,
            _ => Outcome::Success,
        }
    }

    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Startup configuration of a [`RequestDuration`].
#[derive(Clone)]
pub struct RequestDurationConfig {
    meter: MeterPtr,
    attributes: AttributesFn,
    pool_max_idle: usize,
}

impl RequestDurationConfig {
    // ---
    pub fn builder() -> RequestDurationConfigBuilder {
        // ---
        RequestDurationConfigBuilder::default()
    }
}

impl fmt::Debug for RequestDurationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDurationConfig")
            .field("pool_max_idle", &self.pool_max_idle)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RequestDurationConfig`]; meter and attributes are required.
#[derive(Default)]
pub struct RequestDurationConfigBuilder {
    meter: Option<MeterPtr>,
    attributes: Option<AttributesFn>,
    pool_max_idle: Option<usize>,
}

impl RequestDurationConfigBuilder {
    // ---
    pub fn meter(mut self, meter: MeterPtr) -> Self {
        // ---
        self.meter = Some(meter);
        self
    }

    pub fn attributes<F>(mut self, attributes: F) -> Self
    where
        F: Fn(&Request<Bytes>) -> anyhow::Result<Vec<Label>> + Send + Sync + 'static,
    {
        // ---
        self.attributes = Some(Arc::new(attributes));
        self
    }

    pub fn pool_max_idle(mut self, max_idle: usize) -> Self {
        // ---
        self.pool_max_idle = Some(max_idle);
        self
    }

    /// # Errors
    /// Returns an error if the meter or the attributes function is missing.
    pub fn build(self) -> Result<RequestDurationConfig, Error> {
        // ---
        Ok(RequestDurationConfig {
            meter: self.meter.ok_or(Error::MissingMeter)?,
            attributes: self.attributes.ok_or(Error::MissingAttributes)?,
            pool_max_idle: self.pool_max_idle.unwrap_or(DEFAULT_POOL_MAX_IDLE),
        })
    }
}

struct Shared {
    histogram: HistogramPtr,
    attributes: AttributesFn,
    pool: RecorderPool,
}

/// Request-duration middleware, cheap to clone.
#[derive(Clone)]
pub struct RequestDuration {
    shared: Arc<Shared>,
}

impl RequestDuration {
    // ---
    /// Create the `request_duration_millis` histogram.
    ///
    /// # Errors
    /// Returns [`Error::Instrument`] if the meter refuses to create the
    /// histogram. Callers treat this as fatal and must not start serving.
    pub fn new(config: RequestDurationConfig) -> Result<Self, Error> {
        // ---
        let descriptor = descriptor();
        let histogram = config
            .meter
            .histogram(&descriptor)
            .map_err(|source| Error::Instrument {
                name: descriptor.name,
                source,
            })?;

        tracing::info!(metric = descriptor.name, "Created request duration histogram");

        Ok(RequestDuration {
            shared: Arc::new(Shared {
                histogram,
                attributes: config.attributes,
                pool: RecorderPool::new(config.pool_max_idle),
            }),
        })
    }

    /// Wrap `next` so that every request it serves is measured.
    pub fn wrap<H: Handler>(&self, next: H) -> Instrumented<H> {
        // ---
        Instrumented {
            next,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Idle recorder states currently pooled.
    pub fn pooled(&self) -> usize {
        // ---
        self.shared.pool.idle()
    }
}

/// A handler wrapped by [`RequestDuration`].
pub struct Instrumented<H> {
    next: H,
    shared: Arc<Shared>,
}

#[async_trait]
impl<H: Handler> Handler for Instrumented<H> {
    async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        // ---
        let mut measurement = Measurement {
            shared: &self.shared,
            req,
            recorder: RecordingResponseWriter::new(w, self.shared.pool.acquire()),
            start: Instant::now(),
            completed: false,
        };

        self.next.serve(&mut measurement.recorder, req).await;
        measurement.completed = true;
    }
}

/// One in-flight request. Records when dropped, so a request whose future
/// is cancelled, or whose handler panics, is still measured once.
struct Measurement<'a, 'w> {
    shared: &'a Shared,
    req: &'a Request<Bytes>,
    recorder: RecordingResponseWriter<'w, 'a>,
    start: Instant,
    completed: bool,
}

impl Drop for Measurement<'_, '_> {
    fn drop(&mut self) {
        // ---
        let elapsed = self.start.elapsed();

        let outcome = if self.completed {
            Outcome::from_status(self.recorder.status())
        } else {
            tracing::warn!(
                status = ?self.recorder.status(),
                "Request ended before its handler completed"
            );
            Outcome::Failure
        };

        // The pooled state is released after this returns.
        self.shared
            .observe(self.req, self.recorder.state_mut(), outcome, elapsed);
    }
}

impl Shared {
    // ---
    /// Record one measurement. Failures and panics in the attributes
    /// function or the backend are logged and never reach the response.
    fn observe(
        &self,
        req: &Request<Bytes>,
        state: &mut RecorderState,
        outcome: Outcome,
        elapsed: Duration,
    ) {
        // ---
        let base = match panic::catch_unwind(AssertUnwindSafe(|| (self.attributes)(req))) {
            Ok(Ok(base)) => base,
            Ok(Err(err)) => {
                tracing::warn!("Failed to derive request attributes: {err:#}");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Request attributes function panicked");
                Vec::new()
            }
        };

        let labels = state.labels_mut();
        merge_attributes(labels, base, outcome);

        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(millis, outcome = outcome.as_str(), "Recording request duration");

        let recorded = panic::catch_unwind(AssertUnwindSafe(|| {
            self.histogram.record(req.extensions(), millis, labels)
        }));
        if recorded.is_err() {
            tracing::warn!(metric = METRIC_NAME, "Histogram backend panicked while recording");
        }
    }
}

/// Append `base` then the outcome, keeping one entry per key.
///
/// Base entries named `outcome` are dropped; for repeated base keys the first
/// occurrence is kept.
fn merge_attributes(labels: &mut Vec<Label>, base: Vec<Label>, outcome: Outcome) {
    // ---
    for label in base {
        let key = label.key();
        if key == OUTCOME_KEY || labels.iter().any(|l| l.key() == key) {
            tracing::debug!(key, "Dropping duplicate request attribute");
            continue;
        }
        labels.push(label);
    }
    labels.push(Label::new(OUTCOME_KEY, outcome.as_str()));
}
