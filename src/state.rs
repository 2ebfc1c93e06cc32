//! # Application State Management
//!
//! Shared state handed to every HTTP request handler. There is very little
//! of it, and almost all of it is read-only:
//!
//! - **config**: loaded once at startup, never mutated (the Deepgram
//!   credential is fixed for the process lifetime)
//! - **deepgram**: one client whose reqwest connection pool is shared by
//!   all requests; cloning it is cheap
//! - **metrics**: the only mutable piece, guarded by `Arc<RwLock<T>>` so
//!   concurrent requests can record counters without racing
//!
//! ## Arc<RwLock<T>> Pattern:
//! - **Arc**: every handler holds a reference to the same metrics registry
//! - **RwLock**: many readers or one writer at a time; counter updates are
//!   short exclusive writes, snapshots are reads plus a clone

use crate::config::AppConfig;
use crate::transcription::DeepgramClient;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// State shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay configuration, fixed at startup
    config: Arc<AppConfig>,

    /// Deepgram client constructed once from the environment credential
    deepgram: DeepgramClient,

    /// Request and error counters, updated by middleware and handlers
    metrics: Arc<RwLock<RelayMetrics>>,

    /// When the process started, for uptime reporting
    start_time: Instant,
}

/// Counters collected across all requests since startup.
///
/// `provider_errors` and `handler_errors` split the relay's two failure
/// tiers; both also count toward the per-endpoint error totals.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total HTTP requests processed
    pub request_count: u64,

    /// Requests that produced an error response of either tier
    pub error_count: u64,

    /// Failures of the Deepgram round-trip
    pub provider_errors: u64,

    /// Failures inside the relay itself
    pub handler_errors: u64,

    /// Per-endpoint request/latency/error counters, keyed "METHOD /path"
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Counters for a single endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig, deepgram: DeepgramClient) -> Self {
        Self {
            config: Arc::new(config),
            deepgram,
            metrics: Arc::new(RwLock::new(RelayMetrics::default())),
            start_time: Instant::now(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn deepgram(&self) -> &DeepgramClient {
        &self.deepgram
    }

    /// Called by the telemetry middleware for every incoming request.
    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    /// Record latency and outcome for one serviced request.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();

        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();
        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;
        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Record a classified failure. `kind` is [`crate::error::RelayError::kind`];
    /// anything unrecognized still counts toward the overall error total.
    pub fn record_relay_error(&self, kind: &str) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
        match kind {
            "provider" => metrics.provider_errors += 1,
            "handler" => metrics.handler_errors += 1,
            _ => {}
        }
    }

    /// Consistent copy of the counters for the observability endpoints.
    /// Cloning releases the lock before the response is serialized.
    pub fn get_metrics_snapshot(&self) -> RelayMetrics {
        let metrics = self.metrics.read().unwrap();
        RelayMetrics {
            request_count: metrics.request_count,
            error_count: metrics.error_count,
            provider_errors: metrics.provider_errors,
            handler_errors: metrics.handler_errors,
            endpoint_metrics: metrics.endpoint_metrics.clone(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
