//! Pairs-trading strategy.
//!
//! Watches the hedged spread `p1 - beta * p2` over a rolling window and
//! trades its z-score: a stretched spread is sold (short pair), a
//! compressed one bought. Leg prices arrive via
//! [`ControlEvent::PairsUpdate`].

use std::collections::VecDeque;

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

use crate::{clamp_confidence, ControlEvent, Strategy};

pub const PAIRS_TRADING_NAME: &str = "PairsTrading";

/// Below this the spread is considered degenerate and no z-score exists.
const MIN_STD_DEV: f64 = 1e-12;

#[derive(Debug, Clone, Deserialize)]
pub struct PairsTradingConfig {
    /// Hedge ratio between the legs.
    pub beta: f64,
    /// Rolling window length; no signal until it fills.
    pub window: usize,
    /// Z-score magnitude required to act.
    pub z_threshold: f64,
}

impl Default for PairsTradingConfig {
    fn default() -> Self {
        Self {
            beta: 1.0,
            window: 50,
            z_threshold: 2.0,
        }
    }
}

pub struct PairsTrading {
    config: PairsTradingConfig,
    spread_history: VecDeque<f64>,
}

impl PairsTrading {
    pub fn new(config: PairsTradingConfig) -> Self {
        let capacity = config.window;
        Self {
            config,
            spread_history: VecDeque::with_capacity(capacity),
        }
    }

    fn record_spread(&mut self, price_1: f64, price_2: f64) {
        let spread = price_1 - self.config.beta * price_2;
        self.spread_history.push_back(spread);
        if self.spread_history.len() > self.config.window {
            self.spread_history.pop_front();
        }
    }

    /// Z-score of the latest spread; `None` until the window is full or
    /// when the spread has no variance.
    fn z_score(&self) -> Option<f64> {
        if self.spread_history.len() < self.config.window {
            return None;
        }

        let n = self.spread_history.len() as f64;
        let mean: f64 = self.spread_history.iter().sum::<f64>() / n;
        let variance: f64 = self
            .spread_history
            .iter()
            .map(|s| {
                let diff = s - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();
        if std_dev < MIN_STD_DEV {
            return None;
        }

        let last = self.spread_history.back()?;
        Some((last - mean) / std_dev)
    }
}

impl Default for PairsTrading {
    fn default() -> Self {
        Self::new(PairsTradingConfig::default())
    }
}

impl Strategy for PairsTrading {
    fn name(&self) -> &str {
        PAIRS_TRADING_NAME
    }

    fn evaluate(&mut self, _snapshot: &BookSnapshot, _recent_trades: &[TradeInfo]) -> Signal {
        match self.z_score() {
            Some(z) if z > self.config.z_threshold => Signal::ShortPair,
            Some(z) if z < -self.config.z_threshold => Signal::LongPair,
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
        let Some(z) = self.z_score() else {
            return 0.0;
        };
        clamp_confidence((z.abs() - self.config.z_threshold) / self.config.z_threshold)
    }

    fn on_control(&mut self, event: &ControlEvent) {
        if let ControlEvent::PairsUpdate { price_1, price_2 } = *event {
            self.record_spread(price_1, price_2);
        }
    }

    fn reset(&mut self) {
        self.spread_history.clear();
    }
}
