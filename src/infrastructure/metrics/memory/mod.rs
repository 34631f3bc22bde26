mod memory_meter;

pub use memory_meter::{InMemoryMeter, Recording};

/// Creates a new in-memory metrics implementation.
///
/// Every observation is kept in memory and rendered as one line per
/// recording. Meant for tests and local inspection, not for production.
pub fn create() -> anyhow::Result<crate::domain::MeterPtr> {
    Ok(InMemoryMeter::new())
}
