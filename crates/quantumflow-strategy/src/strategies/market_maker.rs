//! Inventory-aware market-making strategy.
//!
//! Tracks running inventory from fills (+buy, -sell). When inventory
//! drifts past half the configured maximum the strategy signals the
//! unwinding side. `quotes` produces skewed bid/ask quotes around mid.

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Side, Signal, TradeInfo};

use crate::{clamp_confidence, Strategy};

pub const MARKET_MAKER_NAME: &str = "MarketMaker";

/// Inventory skew applied per unit of inventory ratio.
const QUOTE_SKEW_FACTOR: f64 = 0.001;

#[derive(Debug, Clone, Deserialize)]
pub struct MarketMakerConfig {
    /// Inventory bound; the signal trigger sits at half of it.
    pub max_inventory: f64,
    /// Quoted spread as a fraction of mid.
    pub base_spread: f64,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            max_inventory: 10.0,
            base_spread: 0.001,
        }
    }
}

pub struct MarketMaker {
    config: MarketMakerConfig,
    inventory: f64,
}

impl MarketMaker {
    pub fn new(config: MarketMakerConfig) -> Self {
        Self {
            config,
            inventory: 0.0,
        }
    }

    fn inventory_ratio(&self) -> f64 {
        self.inventory / self.config.max_inventory
    }

    /// Bid/ask quotes around `mid_price`, skewed against inventory.
    pub fn quotes(&self, mid_price: f64) -> (f64, f64) {
        let half_spread = mid_price * self.config.base_spread / 2.0;
        let skew = self.inventory_ratio() * QUOTE_SKEW_FACTOR;
        (mid_price - half_spread - skew, mid_price + half_spread - skew)
    }

    pub fn inventory(&self) -> f64 {
        self.inventory
    }
}

impl Default for MarketMaker {
    fn default() -> Self {
        Self::new(MarketMakerConfig::default())
    }
}

impl Strategy for MarketMaker {
    fn name(&self) -> &str {
        MARKET_MAKER_NAME
    }

    fn evaluate(&mut self, snapshot: &BookSnapshot, _recent_trades: &[TradeInfo]) -> Signal {
        if snapshot.mid_price <= 0.0 {
            return Signal::Neutral;
        }

        let ratio = self.inventory_ratio();
        if ratio > 0.5 {
            Signal::Sell
        } else if ratio < -0.5 {
            Signal::Buy
        } else {
            Signal::Neutral
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
        clamp_confidence((self.inventory_ratio().abs() - 0.5) / 0.5)
    }

    fn on_trade(&mut self, trade: &TradeInfo) {
        match trade.side {
            Side::Buy => self.inventory += trade.quantity as f64,
            Side::Sell => self.inventory -= trade.quantity as f64,
        }
    }

    fn reset(&mut self) {
        self.inventory = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_snapshot(mid: f64) -> BookSnapshot {
        BookSnapshot {
            symbol: "TEST".to_string(),
            mid_price: mid,
            ..Default::default()
        }
    }

    fn fill(side: Side, quantity: u64) -> TradeInfo {
        TradeInfo {
            price: 100.0,
            quantity,
            side,
            timestamp_ns: 0,
        }
    }

    #[test]
    fn test_neutral_on_flat_inventory() {
        let mut mm = MarketMaker::default();
        assert_eq!(mm.evaluate(&make_snapshot(100.0), &[]), Signal::Neutral);
    }

    #[test]
    fn test_sell_when_inventory_long() {
        let mut mm = MarketMaker::default();
        for _ in 0..6 {
            mm.on_trade(&fill(Side::Buy, 1));
        }
        let sig = mm.evaluate(&make_snapshot(100.0), &[]);
        assert_eq!(sig, Signal::Sell);
        let conf = mm.confidence(&make_snapshot(100.0), &[], sig);
        assert!((conf - 0.2).abs() < 1e-9, "ratio 0.6 -> confidence 0.2, got {conf}");
    }

    #[test]
    fn test_buy_when_inventory_short() {
        let mut mm = MarketMaker::default();
        for _ in 0..8 {
            mm.on_trade(&fill(Side::Sell, 1));
        }
        assert_eq!(mm.evaluate(&make_snapshot(100.0), &[]), Signal::Buy);
    }

    #[test]
    fn test_neutral_without_mid() {
        let mut mm = MarketMaker::default();
        for _ in 0..9 {
            mm.on_trade(&fill(Side::Buy, 1));
        }
        assert_eq!(mm.evaluate(&make_snapshot(0.0), &[]), Signal::Neutral);
    }

    #[test]
    fn test_quote_spread_and_skew() {
        let mm = MarketMaker::new(MarketMakerConfig {
            max_inventory: 10.0,
            base_spread: 0.002,
        });
        let (bid, ask) = mm.quotes(100.0);
        assert!(bid < 100.0);
        assert!(ask > 100.0);
        assert!((ask - bid - 0.2).abs() < 1e-9, "spread = mid * base_spread");

        let mut long_mm = MarketMaker::new(MarketMakerConfig {
            max_inventory: 10.0,
            base_spread: 0.002,
        });
        long_mm.on_trade(&fill(Side::Buy, 5));
        let (skewed_bid, skewed_ask) = long_mm.quotes(100.0);
        // Long inventory shifts both quotes down to favour selling.
        assert!(skewed_bid < bid);
        assert!(skewed_ask < ask);
    }

    #[test]
    fn test_reset_clears_inventory() {
        let mut mm = MarketMaker::default();
        mm.on_trade(&fill(Side::Buy, 7));
        mm.reset();
        assert_eq!(mm.inventory(), 0.0);
        assert_eq!(mm.evaluate(&make_snapshot(100.0), &[]), Signal::Neutral);
    }
}
