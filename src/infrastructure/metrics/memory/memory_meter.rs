use crate::domain::{Histogram, HistogramPtr, InstrumentDescriptor, Meter};
use axum::http::Extensions;
use metrics::Label;
use parking_lot::Mutex;
use std::fmt::Write;
use std::sync::Arc;

/// A single observation captured by an [`InMemoryMeter`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub name: &'static str,
    pub value: u64,
    pub attributes: Vec<Label>,
}

/// Meter keeping every created instrument and observation in memory.
#[derive(Default)]
pub struct InMemoryMeter {
    instruments: Mutex<Vec<InstrumentDescriptor>>,
    recordings: Arc<Mutex<Vec<Recording>>>,
}

impl InMemoryMeter {
    // ---
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Descriptors of every instrument created so far, in creation order.
    pub fn instruments(&self) -> Vec<InstrumentDescriptor> {
        self.instruments.lock().clone()
    }

    /// Snapshot of every observation recorded so far, in recording order.
    pub fn recordings(&self) -> Vec<Recording> {
        self.recordings.lock().clone()
    }
}

impl Meter for InMemoryMeter {
    // ---
    fn histogram(&self, descriptor: &InstrumentDescriptor) -> anyhow::Result<HistogramPtr> {
        self.instruments.lock().push(descriptor.clone());

        Ok(Arc::new(InMemoryHistogram {
            name: descriptor.name,
            recordings: Arc::clone(&self.recordings),
        }))
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for recording in self.recordings.lock().iter() {
            let attrs = recording
                .attributes
                .iter()
                .map(|l| format!("{}={:?}", l.key(), l.value()))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{}{{{}}} {}", recording.name, attrs, recording.value);
        }
        out
    }
}

struct InMemoryHistogram {
    name: &'static str,
    recordings: Arc<Mutex<Vec<Recording>>>,
}

impl Histogram for InMemoryHistogram {
    fn record(&self, _cx: &Extensions, value: u64, attributes: &[Label]) {
        self.recordings.lock().push(Recording {
            name: self.name,
            value,
            attributes: attributes.to_vec(),
        });
    }
}
