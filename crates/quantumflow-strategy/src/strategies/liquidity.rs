//! Hidden-liquidity (iceberg) detector.
//!
//! Repeated fills near one side's best price without that level draining
//! suggest a replenishing hidden order. Per side, strength is
//! `min(fill_count / min_fills, fill_volume / min_volume)` over recent
//! trades within `price_tolerance` of the side's best; strength above 1 is
//! an iceberg. Hidden bid support signals BUY, hidden ask pressure SELL; a
//! detection on both sides cancels out.

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

use crate::{clamp_confidence, Strategy};

pub const LIQUIDITY_DETECTOR_NAME: &str = "LiquidityDetector";

#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityDetectorConfig {
    /// Fill count at which side strength reaches 1.
    pub min_fills: u64,
    /// Fill volume at which side strength reaches 1.
    pub min_volume: u64,
    /// Absolute price distance from the side's best that still counts.
    pub price_tolerance: f64,
}

impl Default for LiquidityDetectorConfig {
    fn default() -> Self {
        Self {
            min_fills: 5,
            min_volume: 100,
            price_tolerance: 0.01,
        }
    }
}

pub struct LiquidityDetector {
    config: LiquidityDetectorConfig,
}

impl LiquidityDetector {
    pub fn new(config: LiquidityDetectorConfig) -> Self {
        Self { config }
    }

    fn side_strength(&self, trades: &[TradeInfo], price_level: f64) -> f64 {
        let mut fill_count = 0u64;
        let mut total_volume = 0u64;
        for trade in trades {
            if (trade.price - price_level).abs() < self.config.price_tolerance {
                fill_count += 1;
                total_volume += trade.quantity;
            }
        }
        let count_strength = fill_count as f64 / self.config.min_fills as f64;
        let volume_strength = total_volume as f64 / self.config.min_volume as f64;
        count_strength.min(volume_strength)
    }
}

impl Default for LiquidityDetector {
    fn default() -> Self {
        Self::new(LiquidityDetectorConfig::default())
    }
}

impl Strategy for LiquidityDetector {
    fn name(&self) -> &str {
        LIQUIDITY_DETECTOR_NAME
    }

    fn evaluate(&mut self, snapshot: &BookSnapshot, recent_trades: &[TradeInfo]) -> Signal {
        if recent_trades.is_empty() || snapshot.bids.is_empty() {
            return Signal::Neutral;
        }

        let bid_iceberg = self.side_strength(recent_trades, snapshot.best_bid) > 1.0;
        let ask_iceberg = self.side_strength(recent_trades, snapshot.best_ask) > 1.0;

        match (bid_iceberg, ask_iceberg) {
            (true, false) => Signal::Buy,
            (false, true) => Signal::Sell,
            _ => Signal::Neutral,
        }
    }

    fn confidence(
        &self,
        snapshot: &BookSnapshot,
        recent_trades: &[TradeInfo],
        signal: Signal,
    ) -> f64 {
        let (side_best, opposite_best) = match signal {
            Signal::Buy => (snapshot.best_bid, snapshot.best_ask),
            Signal::Sell => (snapshot.best_ask, snapshot.best_bid),
            _ => return 0.0,
        };
        let side = self.side_strength(recent_trades, side_best);
        let opposite = self.side_strength(recent_trades, opposite_best);
        clamp_confidence(side - 1.0) * (1.0 - clamp_confidence(opposite - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantumflow_book::SnapshotLevel;
    use quantumflow_models::Side;

    fn make_snapshot(best_bid: f64, best_ask: f64) -> BookSnapshot {
        BookSnapshot {
            symbol: "TEST".to_string(),
            bids: vec![SnapshotLevel {
                price: best_bid,
                quantity: 500,
                order_count: 3,
            }],
            asks: vec![SnapshotLevel {
                price: best_ask,
                quantity: 500,
                order_count: 3,
            }],
            best_bid,
            best_ask,
            mid_price: (best_bid + best_ask) / 2.0,
            timestamp_ns: 0,
        }
    }

    fn trades_at(price: f64, count: usize, quantity: u64) -> Vec<TradeInfo> {
        (0..count)
            .map(|_| TradeInfo {
                price,
                quantity,
                side: Side::Buy,
                timestamp_ns: 0,
            })
            .collect()
    }

    #[test]
    fn test_bid_iceberg_signals_buy() {
        let mut detector = LiquidityDetector::new(LiquidityDetectorConfig {
            min_fills: 3,
            min_volume: 50,
            price_tolerance: 0.1,
        });
        let snap = make_snapshot(100.0, 101.0);
        let trades = trades_at(100.0, 6, 20);
        let sig = detector.evaluate(&snap, &trades);
        assert_eq!(sig, Signal::Buy);
        assert!(detector.confidence(&snap, &trades, sig) > 0.0);
    }

    #[test]
    fn test_ask_iceberg_signals_sell() {
        let mut detector = LiquidityDetector::new(LiquidityDetectorConfig {
            min_fills: 3,
            min_volume: 50,
            price_tolerance: 0.1,
        });
        let snap = make_snapshot(100.0, 101.0);
        let trades = trades_at(101.0, 6, 20);
        assert_eq!(detector.evaluate(&snap, &trades), Signal::Sell);
    }

    #[test]
    fn test_neutral_on_few_fills() {
        let mut detector = LiquidityDetector::default();
        let snap = make_snapshot(100.0, 101.0);
        let trades = trades_at(100.0, 2, 10);
        assert_eq!(detector.evaluate(&snap, &trades), Signal::Neutral);
    }

    #[test]
    fn test_neutral_when_volume_too_small() {
        // Plenty of fills but tiny volume: min() keeps strength below 1.
        let mut detector = LiquidityDetector::default();
        let snap = make_snapshot(100.0, 101.0);
        let trades = trades_at(100.0, 20, 1);
        assert_eq!(detector.evaluate(&snap, &trades), Signal::Neutral);
    }

    #[test]
    fn test_icebergs_on_both_sides_cancel() {
        let mut detector = LiquidityDetector::new(LiquidityDetectorConfig {
            min_fills: 3,
            min_volume: 50,
            price_tolerance: 0.1,
        });
        let snap = make_snapshot(100.0, 101.0);
        let mut trades = trades_at(100.0, 6, 20);
        trades.extend(trades_at(101.0, 6, 20));
        assert_eq!(detector.evaluate(&snap, &trades), Signal::Neutral);
    }

    #[test]
    fn test_neutral_without_trades_or_bids() {
        let mut detector = LiquidityDetector::default();
        let snap = make_snapshot(100.0, 101.0);
        assert_eq!(detector.evaluate(&snap, &[]), Signal::Neutral);

        let empty = BookSnapshot {
            symbol: "TEST".to_string(),
            ..Default::default()
        };
        let trades = trades_at(100.0, 6, 20);
        assert_eq!(detector.evaluate(&empty, &trades), Signal::Neutral);
    }

    #[test]
    fn test_opposite_strength_discounts_confidence() {
        let detector = LiquidityDetector::new(LiquidityDetectorConfig {
            min_fills: 3,
            min_volume: 50,
            price_tolerance: 0.1,
        });
        let snap = make_snapshot(100.0, 101.0);

        let one_sided = trades_at(100.0, 9, 60);
        let lone = detector.confidence(&snap, &one_sided, Signal::Buy);

        let mut contested = trades_at(100.0, 9, 60);
        contested.extend(trades_at(101.0, 4, 30));
        let discounted = detector.confidence(&snap, &contested, Signal::Buy);

        assert!(discounted < lone);
    }
}
