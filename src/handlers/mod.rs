// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod health;
mod metrics;
mod root;
mod sleep;
mod status;

// Instrumented handlers, served through `HandlerService`
pub use health::Health;
pub use root::Root;
pub use sleep::{Sleep, MAX_SLEEP_MS};
pub use status::{NotFound, Status};

// Plain axum handlers
pub use self::metrics::metrics_handler;

use axum::body::Bytes;
use axum::http::Request;

/// Last path segment, the `{param}` of routes like `/status/{code}`.
fn trailing_param(req: &Request<Bytes>) -> &str {
    // ---
    req.uri().path().rsplit('/').next().unwrap_or_default()
}
