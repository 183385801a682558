//! Vendor-agnostic dispatch metrics via a pluggable sink.
//!
//! Implement [`MetricsSink`] and install it with
//! `RestEngine::set_metrics_sink` to forward dispatch outcomes to any backend
//! (Prometheus, OpenTelemetry, a log line). Without a sink, a no-op sink is
//! used.
//!
//! ```ignore
//! use restmap_core::metrics::{DispatchStats, MetricsSink};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct ErrorCounter(AtomicU64);
//!
//! impl MetricsSink for ErrorCounter {
//!     fn on_dispatch(&self, stats: &DispatchStats) {
//!         if stats.aborted {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;

/// Snapshot of one dispatch, passed to [`MetricsSink::on_dispatch`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DispatchStats {
    /// Request method as received
    pub method: String,
    /// Resolved entity path
    pub path: String,
    /// Final status, `None` when no handler wrote a response
    pub status: Option<u16>,
    /// Handlers that completed successfully
    pub handlers_run: usize,
    /// Whether the chain was aborted by an error
    pub aborted: bool,
    /// Wall-clock time of the whole dispatch
    pub duration: Duration,
}

/// Dispatch time broken down by phase, in milliseconds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DispatchPhases {
    /// Chain resolution and prototype lookup
    pub routing_ms: f64,
    /// Sequential handler execution
    pub handlers_ms: f64,
    pub total_ms: f64,
}

impl DispatchPhases {
    /// Time not accounted for by the measured phases.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.routing_ms + self.handlers_ms)
    }
}

/// Emitted once per successful `add_entity`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationStats {
    pub path: String,
    pub registered_at: SystemTime,
}

/// Consumer of dispatch metrics.
///
/// Called synchronously at the end of every dispatch, so implementations
/// must not block. They must be thread-safe, as concurrent requests report
/// concurrently.
pub trait MetricsSink: Send + Sync {
    fn on_dispatch(&self, stats: &DispatchStats);

    /// Per-phase timings; ignored unless overridden.
    fn on_dispatch_phases(&self, _stats: &DispatchStats, _phases: &DispatchPhases) {}

    fn on_registration(&self, _stats: &RegistrationStats) {}
}

/// Drops everything.
pub(crate) struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_dispatch(&self, _stats: &DispatchStats) {}
}

pub(crate) fn noop_sink() -> Arc<dyn MetricsSink> {
    Arc::new(NoOpSink)
}
