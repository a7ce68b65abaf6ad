//! Order-book imbalance strategy.
//!
//! Compares aggregate bid and ask volume over the top N levels:
//! `imbalance = (bid_vol - ask_vol) / total_vol`. Beyond the threshold the
//! heavier side wins; confidence grows with the margin over the threshold.

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

use crate::{clamp_confidence, Strategy};

pub const ORDER_BOOK_IMBALANCE_NAME: &str = "OrderBookImbalance";

#[derive(Debug, Clone, Deserialize)]
pub struct OrderBookImbalanceConfig {
    /// Depth considered per side.
    pub top_n: usize,
    /// Imbalance magnitude required for a directional signal.
    pub threshold: f64,
}

impl Default for OrderBookImbalanceConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            threshold: 0.3,
        }
    }
}

pub struct OrderBookImbalance {
    config: OrderBookImbalanceConfig,
}

impl OrderBookImbalance {
    pub fn new(config: OrderBookImbalanceConfig) -> Self {
        Self { config }
    }

    fn imbalance(&self, snapshot: &BookSnapshot) -> Option<f64> {
        let bid_volume: f64 = snapshot
            .bids
            .iter()
            .take(self.config.top_n)
            .map(|l| l.quantity as f64)
            .sum();
        let ask_volume: f64 = snapshot
            .asks
            .iter()
            .take(self.config.top_n)
            .map(|l| l.quantity as f64)
            .sum();

        let total = bid_volume + ask_volume;
        if total < f64::EPSILON {
            return None;
        }
        Some((bid_volume - ask_volume) / total)
    }
}

impl Default for OrderBookImbalance {
    fn default() -> Self {
        Self::new(OrderBookImbalanceConfig::default())
    }
}

impl Strategy for OrderBookImbalance {
    fn name(&self) -> &str {
        ORDER_BOOK_IMBALANCE_NAME
    }

    fn evaluate(&mut self, snapshot: &BookSnapshot, _recent_trades: &[TradeInfo]) -> Signal {
        match self.imbalance(snapshot) {
            Some(imb) if imb > self.config.threshold => Signal::Buy,
            Some(imb) if imb < -self.config.threshold => Signal::Sell,
            _ => Signal::Neutral,
        }
    }

    fn confidence(
        &self,
        snapshot: &BookSnapshot,
        _recent_trades: &[TradeInfo],
        signal: Signal,
    ) -> f64 {
        if signal == Signal::Neutral {
            return 0.0;
        }
        let Some(imb) = self.imbalance(snapshot) else {
            return 0.0;
        };
        clamp_confidence((imb.abs() - self.config.threshold) / self.config.threshold)
    }
}
