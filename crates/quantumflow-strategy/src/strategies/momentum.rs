//! Mid-price momentum strategy.
//!
//! Keeps a bounded window of observed mids (one per evaluate call) and
//! signals in the direction of the window return once it clears the
//! threshold.

use std::collections::VecDeque;

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

use crate::{clamp_confidence, Strategy};

pub const MOMENTUM_NAME: &str = "Momentum";

#[derive(Debug, Clone, Deserialize)]
pub struct MomentumConfig {
    /// Number of mids retained.
    pub window: usize,
    /// Return magnitude required for a directional signal.
    pub threshold: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window: 20,
            threshold: 0.02,
        }
    }
}

pub struct Momentum {
    config: MomentumConfig,
    price_history: VecDeque<f64>,
}

impl Momentum {
    pub fn new(config: MomentumConfig) -> Self {
        let capacity = config.window;
        Self {
            config,
            price_history: VecDeque::with_capacity(capacity),
        }
    }

    /// Window return, `None` until two mids are recorded.
    fn window_return(&self) -> Option<f64> {
        if self.price_history.len() < 2 {
            return None;
        }
        let first = *self.price_history.front()?;
        let last = *self.price_history.back()?;
        Some((last - first) / first)
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new(MomentumConfig::default())
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        MOMENTUM_NAME
    }

    fn evaluate(&mut self, snapshot: &BookSnapshot, _recent_trades: &[TradeInfo]) -> Signal {
        if snapshot.mid_price <= 0.0 {
            return Signal::Neutral;
        }

        self.price_history.push_back(snapshot.mid_price);
        if self.price_history.len() > self.config.window {
            self.price_history.pop_front();
        }

        match self.window_return() {
            Some(ret) if ret > self.config.threshold => Signal::Buy,
            Some(ret) if ret < -self.config.threshold => Signal::Sell,
            _ => Signal::Neutral,
        }
    }

    fn confidence(
        &self,
        _snapshot: &BookSnapshot,
        _recent_trades: &[TradeInfo],
        signal: Signal,
    ) -> f64 {
        if signal == Signal::Neutral {
            return 0.0;
        }
        let Some(ret) = self.window_return() else {
            return 0.0;
        };
        clamp_confidence((ret.abs() - self.config.threshold) / self.config.threshold)
    }

    fn reset(&mut self) {
        self.price_history.clear();
    }
}
