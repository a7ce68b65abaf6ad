//! Telemetry frame construction and the sink contract.
//!
//! Every frame is a UTF-8 JSON text message of the shape
//! `{"type": T, "timestamp_ns": N, "data": {...}}`. Frames are serialised
//! on the matching thread and handed to a [`TelemetrySink`], which must
//! enqueue without blocking perceptibly; fan-out to consumers happens on
//! the sink's own threads with at-most-once delivery.

use std::collections::HashMap;

use serde::Serialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{LatencySnapshot, StrategySignal, TradeInfo};

/// Trades frame carries at most this many of the latest trades.
pub const TRADES_FRAME_LIMIT: usize = 50;

/// Opaque broadcast interface the core loop publishes through.
pub trait TelemetrySink: Send + Sync {
    /// Enqueue one already-serialised frame. Failures are the sink's
    /// problem; they never surface to the matching thread.
    fn publish(&self, frame: String);
}

/// Sink for headless operation.
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn publish(&self, _frame: String) {}
}

#[derive(Serialize)]
struct Frame<T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    timestamp_ns: u64,
    data: T,
}

fn to_frame<T: Serialize>(kind: &'static str, timestamp_ns: u64, data: T) -> String {
    serde_json::to_string(&Frame {
        kind,
        timestamp_ns,
        data,
    })
    .unwrap_or_default()
}

/// `book` frame: top-of-book summary plus full per-level depth.
pub fn book_frame(snapshot: &BookSnapshot, timestamp_ns: u64) -> String {
    to_frame("book", timestamp_ns, snapshot)
}

#[derive(Serialize)]
struct TradeWire<'a> {
    symbol: &'a str,
    price: f64,
    quantity: u64,
    side: u8,
    timestamp_ns: u64,
}

#[derive(Serialize)]
struct TradesData<'a> {
    symbol: &'a str,
    trades: Vec<TradeWire<'a>>,
}

/// `trades` frame: the last [`TRADES_FRAME_LIMIT`] trades, chronological.
pub fn trades_frame(symbol: &str, trades: &[TradeInfo], timestamp_ns: u64) -> String {
    let start = trades.len().saturating_sub(TRADES_FRAME_LIMIT);
    let trades = trades[start..]
        .iter()
        .map(|t| TradeWire {
            symbol,
            price: t.price,
            quantity: t.quantity,
            side: t.side as u8,
            timestamp_ns: t.timestamp_ns,
        })
        .collect();
    to_frame("trades", timestamp_ns, TradesData { symbol, trades })
}

#[derive(Serialize)]
struct StrategiesData<'a> {
    signals: Vec<&'a StrategySignal>,
}

/// `strategies` frame: every strategy's latest signal, sorted by name so
/// the frame is stable across ticks.
pub fn strategies_frame(
    signals: &HashMap<String, StrategySignal>,
    timestamp_ns: u64,
) -> String {
    let mut signals: Vec<&StrategySignal> = signals.values().collect();
    signals.sort_by(|a, b| a.strategy_name.cmp(&b.strategy_name));
    to_frame("strategies", timestamp_ns, StrategiesData { signals })
}

/// `latency` frame for the last completed tick.
pub fn latency_frame(latency: &LatencySnapshot, timestamp_ns: u64) -> String {
    to_frame("latency", timestamp_ns, latency)
}
