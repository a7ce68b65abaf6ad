//! Strategy registry and per-tick fan-out.
//!
//! Strategies are evaluated in registration order against the same
//! snapshot and trade window; signals produced by one strategy are never
//! inputs to another within a tick. The engine caches each strategy's
//! latest signal by name for telemetry.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use quantumflow_book::BookSnapshot;
use quantumflow_models::{StrategySignal, TradeInfo};

use crate::strategies::{
    FundingArbitrage, LiquidityDetector, MarketMaker, Momentum, OrderBookImbalance, PairsTrading,
    VwapExecutor,
};
use crate::{ControlEvent, Strategy};

#[derive(Default)]
pub struct StrategyEngine {
    strategies: Vec<Box<dyn Strategy>>,
    latest_signals: HashMap<String, StrategySignal>,
    last_timestamp_ns: u64,
}

impl StrategyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with the full built-in strategy set registered, in the
    /// canonical order.
    pub fn with_builtins() -> Self {
        let mut engine = Self::new();
        engine.add_strategy(Box::new(OrderBookImbalance::default()));
        engine.add_strategy(Box::new(MarketMaker::default()));
        engine.add_strategy(Box::new(VwapExecutor::default()));
        engine.add_strategy(Box::new(LiquidityDetector::default()));
        engine.add_strategy(Box::new(FundingArbitrage::default()));
        engine.add_strategy(Box::new(Momentum::default()));
        engine.add_strategy(Box::new(PairsTrading::default()));
        engine
    }

    /// Register a strategy. Evaluation order follows registration order.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    /// Run every strategy against the snapshot and trade window, returning
    /// the stamped signal batch and refreshing the latest-signal cache.
    pub fn evaluate(
        &mut self,
        snapshot: &BookSnapshot,
        recent_trades: &[TradeInfo],
    ) -> Vec<StrategySignal> {
        let timestamp_ns = self.next_timestamp_ns();
        let mut signals = Vec::with_capacity(self.strategies.len());

        for strategy in &mut self.strategies {
            let signal = strategy.evaluate(snapshot, recent_trades);
            let confidence = strategy.confidence(snapshot, recent_trades, signal);
            let stamped = StrategySignal {
                strategy_name: strategy.name().to_string(),
                symbol: snapshot.symbol.clone(),
                signal,
                confidence,
                timestamp_ns,
            };
            self.latest_signals
                .insert(stamped.strategy_name.clone(), stamped.clone());
            signals.push(stamped);
        }

        signals
    }

    /// Notify every strategy of an executed fill, in registration order.
    pub fn on_trade(&mut self, trade: &TradeInfo) {
        for strategy in &mut self.strategies {
            strategy.on_trade(trade);
        }
    }

    /// Fan an out-of-band input to every strategy.
    pub fn apply_control(&mut self, event: &ControlEvent) {
        for strategy in &mut self.strategies {
            strategy.on_control(event);
        }
    }

    pub fn latest_signal(&self, strategy_name: &str) -> Option<&StrategySignal> {
        self.latest_signals.get(strategy_name)
    }

    pub fn all_signals(&self) -> &HashMap<String, StrategySignal> {
        &self.latest_signals
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    pub fn reset_all(&mut self) {
        for strategy in &mut self.strategies {
            strategy.reset();
        }
    }

    /// Wall-clock nanoseconds, clamped so stamps never regress.
    fn next_timestamp_ns(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        self.last_timestamp_ns = now.max(self.last_timestamp_ns);
        self.last_timestamp_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantumflow_models::{Side, Signal};

    struct Fixed {
        name: &'static str,
        signal: Signal,
    }

    impl Fixed {
        fn new(name: &'static str, signal: Signal) -> Self {
            Self { name, signal }
        }
    }

    impl Strategy for Fixed {
        fn name(&self) -> &str {
            self.name
        }
        fn evaluate(&mut self, _s: &BookSnapshot, _t: &[TradeInfo]) -> Signal {
            self.signal
        }
    }

    fn snapshot() -> BookSnapshot {
        BookSnapshot {
            symbol: "TEST".to_string(),
            mid_price: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluation_preserves_registration_order() {
        let mut engine = StrategyEngine::new();
        engine.add_strategy(Box::new(Fixed::new("alpha", Signal::Buy)));
        engine.add_strategy(Box::new(Fixed::new("beta", Signal::Sell)));
        engine.add_strategy(Box::new(Fixed::new("gamma", Signal::Neutral)));

        let signals = engine.evaluate(&snapshot(), &[]);

        assert_eq!(
            signals.iter().map(|s| s.strategy_name.as_str()).collect::<Vec<_>>(),
            vec!["alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_latest_signal_cache_updates() {
        let mut engine = StrategyEngine::new();
        engine.add_strategy(Box::new(Fixed::new("alpha", Signal::Buy)));

        engine.evaluate(&snapshot(), &[]);
        let latest = engine.latest_signal("alpha").unwrap();
        assert_eq!(latest.signal, Signal::Buy);
        assert_eq!(latest.symbol, "TEST");
        assert!(engine.latest_signal("missing").is_none());
        assert_eq!(engine.all_signals().len(), 1);
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let mut engine = StrategyEngine::new();
        engine.add_strategy(Box::new(Fixed::new("alpha", Signal::Buy)));

        let first = engine.evaluate(&snapshot(), &[])[0].timestamp_ns;
        let second = engine.evaluate(&snapshot(), &[])[0].timestamp_ns;
        assert!(second >= first);
    }

    #[test]
    fn test_default_confidence_applied() {
        let mut engine = StrategyEngine::new();
        engine.add_strategy(Box::new(Fixed::new("directional", Signal::Buy)));
        engine.add_strategy(Box::new(Fixed::new("flat", Signal::Neutral)));

        let signals = engine.evaluate(&snapshot(), &[]);
        assert_eq!(signals[0].confidence, 0.5);
        assert_eq!(signals[1].confidence, 0.0);
    }

    #[test]
    fn test_trade_fan_out_reaches_market_maker() {
        let mut engine = StrategyEngine::with_builtins();
        // Six buy fills push the market maker's inventory ratio past 0.5.
        for _ in 0..6 {
            engine.on_trade(&TradeInfo {
                price: 100.0,
                quantity: 1,
                side: Side::Buy,
                timestamp_ns: 1,
            });
        }

        engine.evaluate(&snapshot(), &[]);
        let mm = engine.latest_signal("MarketMaker").unwrap();
        assert_eq!(mm.signal, Signal::Sell);
    }

    #[test]
    fn test_builtin_set_is_complete_and_bounded() {
        let mut engine = StrategyEngine::with_builtins();
        assert_eq!(engine.strategy_count(), 7);

        let signals = engine.evaluate(&snapshot(), &[]);
        assert_eq!(signals.len(), 7);
        for signal in &signals {
            assert!(
                (0.0..=1.0).contains(&signal.confidence),
                "{} confidence {} out of range",
                signal.strategy_name,
                signal.confidence
            );
        }
    }

    #[test]
    fn test_control_reaches_funding_strategy() {
        let mut engine = StrategyEngine::with_builtins();
        engine.apply_control(&ControlEvent::FundingUpdate {
            funding_rate: 0.005,
            spot_price: 100.0,
            perp_price: 101.0,
        });

        engine.evaluate(&snapshot(), &[]);
        let funding = engine.latest_signal("FundingArbitrage").unwrap();
        assert_eq!(funding.signal, Signal::LongSpotShortPerp);
        assert_eq!(funding.confidence, 1.0);
    }

    #[test]
    fn test_reset_all_clears_strategy_state() {
        let mut engine = StrategyEngine::with_builtins();
        engine.apply_control(&ControlEvent::FundingUpdate {
            funding_rate: 0.005,
            spot_price: 100.0,
            perp_price: 101.0,
        });
        engine.reset_all();

        engine.evaluate(&snapshot(), &[]);
        let funding = engine.latest_signal("FundingArbitrage").unwrap();
        assert_eq!(funding.signal, Signal::Neutral);
    }
}
