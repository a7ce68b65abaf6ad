//! Strategy SDK for QuantumFlow.
//!
//! A strategy is a stateful object evaluated once per tick against an
//! immutable book snapshot and a bounded window of recent trades. It
//! returns a [`Signal`] and, on request, a confidence in `[0, 1]`.
//!
//! ## Contract
//! 1. `evaluate` is pure with respect to its inputs plus the strategy's own
//!    accumulated state; it never sees other strategies' signals.
//! 2. `on_trade` is called for every executed fill, including fills the
//!    engine's own matching produced.
//! 3. Inputs the market-data feed does not carry (funding rates, pair
//!    prices) arrive through [`ControlEvent`]s fanned out by the engine.
//!
//! The engine preserves registration order; see [`engine::StrategyEngine`].

pub mod engine;
pub mod strategies;

pub use engine::StrategyEngine;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

/// Clamp a confidence drive into `[0, 1]`.
pub fn clamp_confidence(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Out-of-band inputs for strategies that need more than the book feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Perpetual funding context for the funding-arbitrage strategy.
    FundingUpdate {
        funding_rate: f64,
        spot_price: f64,
        perp_price: f64,
    },
    /// Leg prices for the pairs-trading strategy.
    PairsUpdate { price_1: f64, price_2: f64 },
}

/// Core interface every trading strategy implements.
pub trait Strategy: Send {
    /// Stable identifier, unique within an engine.
    fn name(&self) -> &str;

    /// Classify the current market state.
    fn evaluate(&mut self, snapshot: &BookSnapshot, recent_trades: &[TradeInfo]) -> Signal;

    /// Confidence in the signal just produced, in `[0, 1]`.
    ///
    /// The default is 0.5 for any non-neutral signal and 0 for neutral;
    /// implementations override this with their own drive-over-threshold
    /// rule.
    fn confidence(
        &self,
        _snapshot: &BookSnapshot,
        _recent_trades: &[TradeInfo],
        signal: Signal,
    ) -> f64 {
        if signal == Signal::Neutral { 0.0 } else { 0.5 }
    }

    /// Observe one executed fill.
    fn on_trade(&mut self, _trade: &TradeInfo) {}

    /// Observe an out-of-band control input.
    fn on_control(&mut self, _event: &ControlEvent) {}

    /// Clear accumulated state.
    fn reset(&mut self) {}
}
