//! VWAP execution strategy.
//!
//! Splits a parent order across a time horizon following a volume profile
//! (uniform one-second slices unless one is supplied) and signals BUY
//! whenever execution lags the cumulative schedule target. The slice clock
//! advances via [`VwapExecutor::advance_time`]; fills accrue via
//! `on_trade`.

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

use crate::{clamp_confidence, Strategy};

pub const VWAP_EXECUTOR_NAME: &str = "VWAPExecutor";

#[derive(Debug, Clone, Deserialize)]
pub struct VwapExecutorConfig {
    /// Parent order size; zero disables the executor.
    pub total_quantity: u64,
    /// Execution horizon in milliseconds.
    pub time_horizon_ms: u64,
    /// Per-slice volume fractions; empty means uniform 1 s slices.
    #[serde(default)]
    pub volume_profile: Vec<f64>,
}

impl Default for VwapExecutorConfig {
    fn default() -> Self {
        Self {
            total_quantity: 0,
            time_horizon_ms: 60_000,
            volume_profile: Vec::new(),
        }
    }
}

pub struct VwapExecutor {
    config: VwapExecutorConfig,
    profile: Vec<f64>,
    executed_quantity: u64,
    elapsed_ms: u64,
}

impl VwapExecutor {
    pub fn new(config: VwapExecutorConfig) -> Self {
        let profile = if config.volume_profile.is_empty() {
            let slices = (config.time_horizon_ms / 1000).max(1) as usize;
            vec![1.0 / slices as f64; slices]
        } else {
            config.volume_profile.clone()
        };
        Self {
            config,
            profile,
            executed_quantity: 0,
            elapsed_ms: 0,
        }
    }

    /// Advance the slice clock.
    pub fn advance_time(&mut self, delta_ms: u64) {
        self.elapsed_ms += delta_ms;
    }

    pub fn executed_quantity(&self) -> u64 {
        self.executed_quantity
    }

    /// Cumulative schedule target at the current slice, `None` once the
    /// horizon is exhausted.
    fn target_quantity(&self) -> Option<u64> {
        let current_slice = (self.elapsed_ms / 1000) as usize;
        if current_slice >= self.profile.len() {
            return None;
        }
        let target_fraction: f64 = self.profile[..=current_slice].iter().sum();
        Some((self.config.total_quantity as f64 * target_fraction) as u64)
    }
}

impl Default for VwapExecutor {
    fn default() -> Self {
        Self::new(VwapExecutorConfig::default())
    }
}

impl Strategy for VwapExecutor {
    fn name(&self) -> &str {
        VWAP_EXECUTOR_NAME
    }

    fn evaluate(&mut self, _snapshot: &BookSnapshot, _recent_trades: &[TradeInfo]) -> Signal {
        if self.config.total_quantity == 0 || self.executed_quantity >= self.config.total_quantity
        {
            return Signal::Neutral;
        }

        match self.target_quantity() {
            Some(target) if self.executed_quantity < target => Signal::Buy,
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
        let Some(target) = self.target_quantity() else {
            return 0.0;
        };
        let deficit = target.saturating_sub(self.executed_quantity) as f64;
        let remaining = (self.config.total_quantity - self.executed_quantity) as f64;
        if remaining <= 0.0 {
            return 0.0;
        }
        clamp_confidence(deficit / remaining)
    }

    fn on_trade(&mut self, trade: &TradeInfo) {
        self.executed_quantity += trade.quantity;
    }

    fn reset(&mut self) {
        self.executed_quantity = 0;
        self.elapsed_ms = 0;
    }
}
