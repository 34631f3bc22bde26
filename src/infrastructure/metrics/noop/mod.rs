// src/infrastructure/metrics/noop/mod.rs
mod noop_meter;

pub use noop_meter::{NoopHistogram, NoopMeter};
use std::sync::Arc;

/// Creates a new no-op metrics implementation.
///
/// This implementation does nothing - every histogram it hands out ignores
/// its recordings. Useful for development, testing, or when metrics are
/// disabled.
pub fn create() -> anyhow::Result<crate::domain::MeterPtr> {
    Ok(Arc::new(NoopMeter::new()))
}
