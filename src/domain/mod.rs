mod http;
mod metrics;

// Publicly expose the Metrics abstraction
pub use self::metrics::{Histogram, HistogramPtr, InstrumentDescriptor, Meter, MeterPtr};

// Publicly expose the handler-chaining abstraction
pub use self::http::{Handler, ResponseWriter};
