//! Per-stage latency accounting for the core loop.
//!
//! Only the last completed tick's values are kept; history and
//! aggregation belong to downstream consumers of the latency frame.

use std::time::Instant;

use quantumflow_models::LatencySnapshot;

#[derive(Debug, Default)]
pub struct LatencyMeter {
    last: LatencySnapshot,
}

impl LatencyMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed tick.
    pub fn record(&mut self, snapshot: LatencySnapshot) {
        self.last = snapshot;
    }

    /// The last completed tick's timings.
    pub fn snapshot(&self) -> LatencySnapshot {
        self.last
    }
}

/// Elapsed microseconds between two monotonic instants.
pub fn elapsed_us(from: Instant, to: Instant) -> f64 {
    to.duration_since(from).as_secs_f64() * 1_000_000.0
}
