//! Shared leaf types for the QuantumFlow trading engine.
//!
//! Everything the ingress bridge, the order books, the strategies and the
//! runner exchange lives here: the fixed-layout market-data event and its
//! wire codec, trade records, strategy signals, latency snapshots, and the
//! per-symbol price converter registry.
//!
//! This crate deliberately has no async, no I/O and no hot-path allocation;
//! it is depended on by every other QuantumFlow crate.

pub mod convert;
pub mod event;
pub mod latency;
pub mod signal;
pub mod wire;

pub use convert::{PriceConverter, PriceConverterRegistry};
pub use event::{EventKind, MarketDataEvent, Side, TradeInfo, SYMBOL_LEN};
pub use latency::LatencySnapshot;
pub use signal::{Signal, StrategySignal};
pub use wire::{WireError, WIRE_SIZE};

/// Internal scaled price. Books and levels are keyed on this.
pub type Price = u32;

/// Scaled volume, as produced by the upstream quantity scaler.
pub type Volume = u64;

/// Process-wide order identifier.
pub type OrderId = u64;
