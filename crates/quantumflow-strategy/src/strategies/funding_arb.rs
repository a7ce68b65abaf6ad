//! Funding-rate arbitrage strategy.
//!
//! When the perpetual funding rate is persistently positive, longs pay
//! shorts: hold spot, short the perp, and collect the funding leg
//! (inverted when the rate is negative). Funding context arrives via
//! [`ControlEvent::FundingUpdate`] since the market-data feed does not
//! carry it.

use serde::Deserialize;

use quantumflow_book::BookSnapshot;
use quantumflow_models::{Signal, TradeInfo};

use crate::{clamp_confidence, ControlEvent, Strategy};

pub const FUNDING_ARBITRAGE_NAME: &str = "FundingArbitrage";

/// Basis of 1% of spot saturates the basis score.
const BASIS_SCORE_SCALE: f64 = 0.01;

#[derive(Debug, Clone, Deserialize)]
pub struct FundingArbitrageConfig {
    /// Funding-rate magnitude required to act.
    pub funding_threshold: f64,
}

impl Default for FundingArbitrageConfig {
    fn default() -> Self {
        Self {
            funding_threshold: 0.001,
        }
    }
}

pub struct FundingArbitrage {
    config: FundingArbitrageConfig,
    funding_rate: f64,
    spot_price: f64,
    perp_price: f64,
}

impl FundingArbitrage {
    pub fn new(config: FundingArbitrageConfig) -> Self {
        Self {
            config,
            funding_rate: 0.0,
            spot_price: 0.0,
            perp_price: 0.0,
        }
    }

    fn funding_score(&self) -> f64 {
        let threshold = self.config.funding_threshold;
        clamp_confidence((self.funding_rate.abs() - threshold) / threshold)
    }

    fn basis_score(&self) -> f64 {
        if self.spot_price <= 0.0 {
            return 0.0;
        }
        let basis = (self.perp_price - self.spot_price).abs() / self.spot_price;
        clamp_confidence(basis / BASIS_SCORE_SCALE)
    }
}

impl Default for FundingArbitrage {
    fn default() -> Self {
        Self::new(FundingArbitrageConfig::default())
    }
}

impl Strategy for FundingArbitrage {
    fn name(&self) -> &str {
        FUNDING_ARBITRAGE_NAME
    }

    fn evaluate(&mut self, _snapshot: &BookSnapshot, _recent_trades: &[TradeInfo]) -> Signal {
        if self.funding_rate > self.config.funding_threshold {
            // Longs pay shorts: collect funding with spot long / perp short.
            Signal::LongSpotShortPerp
        } else if self.funding_rate < -self.config.funding_threshold {
            Signal::ShortSpotLongPerp
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
        clamp_confidence(0.7 * self.funding_score() + 0.3 * self.basis_score())
    }

    fn on_control(&mut self, event: &ControlEvent) {
        if let ControlEvent::FundingUpdate {
            funding_rate,
            spot_price,
            perp_price,
        } = *event
        {
            self.funding_rate = funding_rate;
            self.spot_price = spot_price;
            self.perp_price = perp_price;
        }
    }

    fn reset(&mut self) {
        self.funding_rate = 0.0;
        self.spot_price = 0.0;
        self.perp_price = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> BookSnapshot {
        BookSnapshot::default()
    }

    fn funding(rate: f64, spot: f64, perp: f64) -> ControlEvent {
        ControlEvent::FundingUpdate {
            funding_rate: rate,
            spot_price: spot,
            perp_price: perp,
        }
    }

    #[test]
    fn test_positive_funding_longs_spot_shorts_perp() {
        let mut strat = FundingArbitrage::default();
        strat.on_control(&funding(0.005, 100.0, 101.0));

        let sig = strat.evaluate(&snapshot(), &[]);
        assert_eq!(sig, Signal::LongSpotShortPerp);
        // funding_score saturates (0.005 vs 0.001) and basis is a full 1%.
        assert_eq!(strat.confidence(&snapshot(), &[], sig), 1.0);
    }

    #[test]
    fn test_negative_funding_inverts_legs() {
        let mut strat = FundingArbitrage::default();
        strat.on_control(&funding(-0.002, 100.0, 99.5));
        assert_eq!(strat.evaluate(&snapshot(), &[]), Signal::ShortSpotLongPerp);
    }

    #[test]
    fn test_neutral_inside_threshold() {
        let mut strat = FundingArbitrage::default();
        strat.on_control(&funding(0.0005, 100.0, 100.0));
        let sig = strat.evaluate(&snapshot(), &[]);
        assert_eq!(sig, Signal::Neutral);
        assert_eq!(strat.confidence(&snapshot(), &[], sig), 0.0);
    }

    #[test]
    fn test_confidence_blends_funding_and_basis() {
        let mut strat = FundingArbitrage::default();
        // funding_score = clamp((0.0015 - 0.001)/0.001) = 0.5, basis = 0.
        strat.on_control(&funding(0.0015, 100.0, 100.0));
        let sig = strat.evaluate(&snapshot(), &[]);
        let conf = strat.confidence(&snapshot(), &[], sig);
        assert!((conf - 0.35).abs() < 1e-9, "0.7 * 0.5 expected, got {conf}");
    }

    #[test]
    fn test_zero_spot_price_gives_zero_basis_score() {
        let mut strat = FundingArbitrage::default();
        strat.on_control(&funding(0.005, 0.0, 101.0));
        let sig = strat.evaluate(&snapshot(), &[]);
        let conf = strat.confidence(&snapshot(), &[], sig);
        assert!((conf - 0.7).abs() < 1e-9, "funding leg only, got {conf}");
    }

    #[test]
    fn test_reset_clears_state() {
        let mut strat = FundingArbitrage::default();
        strat.on_control(&funding(0.005, 100.0, 101.0));
        strat.reset();
        assert_eq!(strat.evaluate(&snapshot(), &[]), Signal::Neutral);
    }
}
