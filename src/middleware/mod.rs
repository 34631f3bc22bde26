// Gateway module - controls public API for the middleware
// Modules are private, only exported symbols are public

mod recording_writer;
mod request_duration;

pub use recording_writer::{PooledState, RecorderPool, RecorderState, RecordingResponseWriter};
pub use request_duration::{
    descriptor, AttributesFn, Instrumented, Outcome, RequestDuration, RequestDurationConfig,
    RequestDurationConfigBuilder, DEFAULT_POOL_MAX_IDLE, METRIC_DESCRIPTION, METRIC_NAME,
    OUTCOME_KEY,
};

/// Startup-time errors of the middleware.
///
/// All of them are configuration or deployment errors: the service must not
/// start serving uninstrumented.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing required configuration: meter")]
    MissingMeter,

    #[error("Missing required configuration: attributes function")]
    MissingAttributes,

    #[error("unable to create {name} histogram: {source}")]
    Instrument {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
