//! Application state management.
//!
//! This module defines the shared state passed to the plain axum handlers
//! (currently only `/metrics`) via the `State` extractor. Instrumented
//! handlers do not see it; they are wrapped by the middleware before the
//! router is built.

use crate::domain::MeterPtr;

/// Shared application state passed to all Axum handlers.
///
/// # Lifecycle
///
/// 1. Created once in `create_router_with()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Metrics backend the request-duration histogram was created from.
    ///
    /// Wrapped in `Arc` via `MeterPtr` for cheap cloning.
    meter: MeterPtr,
}

impl AppState {
    // ---

    pub fn new(meter: MeterPtr) -> Self {
        // ---
        AppState { meter }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn meter(&self) -> &MeterPtr {
        // ---
        &self.meter
    }
}

#[cfg(test)]
mod tests {
    // ---

    use super::*;
    use crate::infrastructure::create_noop_metrics;

    #[test]
    fn test_app_state_creation_and_clone() {
        // ---
        let meter = create_noop_metrics().unwrap();

        let app_state = AppState::new(meter);
        let cloned = app_state.clone();

        assert!(cloned.meter().render().is_empty());
    }
}
