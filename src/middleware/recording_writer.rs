//! Status-capturing response writer and its state pool.
//!
//! [`RecordingResponseWriter`] decorates a borrowed [`ResponseWriter`],
//! remembering the first status sent through it while forwarding every call
//! unchanged. Its per-request state lives in a [`RecorderState`] checked out
//! of a [`RecorderPool`]; the state also carries the attribute buffer the
//! middleware fills, so its capacity is reused across requests.

use crate::domain::ResponseWriter;
use axum::http::{HeaderMap, StatusCode};
use metrics::Label;
use parking_lot::Mutex;
use std::io;

/// Mutable per-request state of a [`RecordingResponseWriter`].
#[derive(Debug, Default)]
pub struct RecorderState {
    status: Option<StatusCode>,
    header_written: bool,
    labels: Vec<Label>,
}

impl RecorderState {
    // ---
    fn reset(&mut self) {
        // ---
        self.status = None;
        self.header_written = false;
        self.labels.clear();
    }

    /// Status captured so far, `None` if nothing was sent.
    pub fn status(&self) -> Option<StatusCode> {
        // ---
        self.status
    }

    /// Attribute buffer for the current request; empty on checkout.
    pub fn labels_mut(&mut self) -> &mut Vec<Label> {
        // ---
        &mut self.labels
    }
}

/// Bounded pool of idle [`RecorderState`]s.
///
/// Every checkout is exclusive. States are reset when handed out and cleared
/// again when returned; states beyond `max_idle` are dropped on return.
#[derive(Debug)]
pub struct RecorderPool {
    idle: Mutex<Vec<RecorderState>>,
    max_idle: usize,
}

impl RecorderPool {
    // ---
    pub fn new(max_idle: usize) -> Self {
        // ---
        RecorderPool {
            idle: Mutex::new(Vec::with_capacity(max_idle.min(64))),
            max_idle,
        }
    }

    /// Check out a state, reset to its default values.
    pub fn acquire(&self) -> PooledState<'_> {
        // ---
        let mut state = self.idle.lock().pop().unwrap_or_default();
        state.reset();

        PooledState {
            pool: self,
            state,
        }
    }

    /// Number of states currently waiting for reuse.
    pub fn idle(&self) -> usize {
        // ---
        self.idle.lock().len()
    }

    fn release(&self, mut state: RecorderState) {
        // ---
        state.reset();

        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(state);
        }
    }
}

/// Scoped checkout from a [`RecorderPool`]; returns the state on drop.
#[derive(Debug)]
pub struct PooledState<'p> {
    pool: &'p RecorderPool,
    state: RecorderState,
}

impl std::ops::Deref for PooledState<'_> {
    type Target = RecorderState;

    fn deref(&self) -> &RecorderState {
        &self.state
    }
}

impl std::ops::DerefMut for PooledState<'_> {
    fn deref_mut(&mut self) -> &mut RecorderState {
        &mut self.state
    }
}

impl Drop for PooledState<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.state));
    }
}

/// Response writer decorator that records the first status sent.
pub struct RecordingResponseWriter<'w, 'p> {
    inner: &'w mut dyn ResponseWriter,
    state: PooledState<'p>,
}

impl<'w, 'p> RecordingResponseWriter<'w, 'p> {
    // ---
    pub fn new(inner: &'w mut dyn ResponseWriter, state: PooledState<'p>) -> Self {
        // ---
        RecordingResponseWriter { inner, state }
    }

    /// Status captured from the wrapped handler, `None` if it sent nothing.
    pub fn status(&self) -> Option<StatusCode> {
        // ---
        self.state.status
    }

    /// Per-request state; goes back to the pool when the writer drops.
    pub fn state_mut(&mut self) -> &mut RecorderState {
        // ---
        &mut self.state
    }

    fn capture(&mut self, status: StatusCode) {
        // ---
        if !self.state.header_written {
            self.state.status = Some(status);
            self.state.header_written = true;
        }
    }
}

impl ResponseWriter for RecordingResponseWriter<'_, '_> {
    // ---
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.capture(status);
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.capture(StatusCode::OK);
        self.inner.write(buf)
    }
}
