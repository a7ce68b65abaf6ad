//! Per-tick latency accounting snapshot.

use serde::Serialize;

/// Component-wise elapsed time for the last completed tick, in microseconds.
///
/// Serialised field names are wire-stable; `ingest_us` keeps its historical
/// wire name from the original producer bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySnapshot {
    /// Producer timestamp → consumption delay of the most recent event.
    #[serde(rename = "python_to_cpp_us")]
    pub ingest_us: f64,
    /// Ingress drain + book updates.
    #[serde(rename = "order_match_us")]
    pub match_us: f64,
    /// Snapshot + strategy fan-out.
    #[serde(rename = "strategy_eval_us")]
    pub strategy_us: f64,
    /// Telemetry serialisation + enqueue; zero on non-broadcast ticks.
    #[serde(rename = "ws_broadcast_us")]
    pub broadcast_us: f64,
    pub total_us: f64,
}
