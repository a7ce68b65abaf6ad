//! Built-in strategy implementations.

pub mod funding_arb;
pub mod imbalance;
pub mod liquidity;
pub mod market_maker;
pub mod momentum;
pub mod pairs;
pub mod vwap;

pub use funding_arb::{FundingArbitrage, FundingArbitrageConfig};
pub use imbalance::{OrderBookImbalance, OrderBookImbalanceConfig};
pub use liquidity::{LiquidityDetector, LiquidityDetectorConfig};
pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use momentum::{Momentum, MomentumConfig};
pub use pairs::{PairsTrading, PairsTradingConfig};
pub use vwap::{VwapExecutor, VwapExecutorConfig};
