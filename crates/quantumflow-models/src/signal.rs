//! Strategy signal taxonomy.

use serde::Serialize;

/// A strategy's classification of the current market state.
///
/// Serialised names are wire-stable: downstream consumers match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Neutral,
    Buy,
    Sell,
    LongSpotShortPerp,
    ShortSpotLongPerp,
    LongPair,
    ShortPair,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Neutral => "NEUTRAL",
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::LongSpotShortPerp => "LONG_SPOT_SHORT_PERP",
            Signal::ShortSpotLongPerp => "SHORT_SPOT_LONG_PERP",
            Signal::LongPair => "LONG_PAIR",
            Signal::ShortPair => "SHORT_PAIR",
        }
    }
}

/// A signal stamped with its producing strategy, symbol and confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySignal {
    pub strategy_name: String,
    pub symbol: String,
    pub signal: Signal,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub timestamp_ns: u64,
}
