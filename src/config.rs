// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the demo server
//! and the metrics backend behind it. Configuration is validated eagerly and
//! failures are treated as deployment errors rather than recoverable runtime
//! conditions.

use anyhow::Result;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub metrics: telemetry::MetricsConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            metrics: telemetry::MetricsConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;
    use crate::infrastructure::http::DEFAULT_MAX_BODY_BYTES;

    /// HTTP server configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Value of the `service` attribute on every measurement.
        pub service_name: String,

        /// Listen address. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,

        /// Largest request body buffered for a handler. Defaults to 2 MiB.
        pub max_body_bytes: usize,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let service_name = required_env!("REQDUR_SERVICE_NAME");
            let bind_addr = std::env::var("REQDUR_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
            let max_body_bytes =
                optional_env_parse!("REQDUR_MAX_BODY_BYTES", usize, DEFAULT_MAX_BODY_BYTES);

            Ok(Self {
                service_name,
                bind_addr,
                max_body_bytes,
            })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod telemetry {
    // ---
    use super::*;
    use crate::infrastructure::metrics::prometheus::DEFAULT_BUCKETS_MS;
    use crate::middleware::DEFAULT_POOL_MAX_IDLE;
    use anyhow::{anyhow, ensure};
    use std::str::FromStr;

    /// Which metrics backend receives the measurements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsBackend {
        Prometheus,
        Memory,
        Noop,
    }

    impl FromStr for MetricsBackend {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> Result<Self> {
            // ---
            match s {
                "prom" => Ok(MetricsBackend::Prometheus),
                "memory" => Ok(MetricsBackend::Memory),
                "noop" => Ok(MetricsBackend::Noop),
                other => Err(anyhow!(
                    "Invalid configuration: REQDUR_METRICS_TYPE={other:?} (expected prom, memory or noop)"
                )),
            }
        }
    }

    /// Metrics-related configuration.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Backend selection. Defaults to `noop`.
        pub backend: MetricsBackend,

        /// Histogram bucket boundaries in milliseconds, strictly increasing.
        pub buckets_ms: Vec<f64>,

        /// Idle recorder states kept by the middleware. Defaults to 256.
        pub pool_max_idle: usize,
    }

    impl MetricsConfig {
        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the backend name or the bucket list is invalid.
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = match std::env::var("REQDUR_METRICS_TYPE") {
                Ok(value) => value.parse()?,
                Err(_) => MetricsBackend::Noop,
            };

            let buckets_ms = match std::env::var("REQDUR_HISTOGRAM_BUCKETS_MS") {
                Ok(value) => parse_buckets(&value)?,
                Err(_) => DEFAULT_BUCKETS_MS.to_vec(),
            };

            let pool_max_idle =
                optional_env_parse!("REQDUR_POOL_MAX_IDLE", usize, DEFAULT_POOL_MAX_IDLE);

            Ok(Self {
                backend,
                buckets_ms,
                pool_max_idle,
            })
        }
    }

    fn parse_buckets(value: &str) -> Result<Vec<f64>> {
        // ---
        let buckets = value
            .split(',')
            .map(|b| b.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| {
                anyhow!("Invalid configuration: REQDUR_HISTOGRAM_BUCKETS_MS ({err})")
            })?;

        ensure!(
            !buckets.is_empty() && buckets.windows(2).all(|w| w[0] < w[1]),
            "Invalid configuration: REQDUR_HISTOGRAM_BUCKETS_MS must be strictly increasing"
        );

        Ok(buckets)
    }
}
pub use telemetry::{MetricsBackend, MetricsConfig};

// ============================================================
// Tests
// ============================================================
