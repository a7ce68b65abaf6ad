//! Market-data events as they cross the ingress boundary.
//!
//! `MarketDataEvent` is `Copy` and fixed-size so it can sit in a ring slot
//! without allocation. The symbol is a null-padded ASCII buffer matching the
//! wire record; use [`MarketDataEvent::symbol`] to view it as a `&str`.

use serde::Serialize;

/// Width of the symbol field, including the padding byte. Symbols longer
/// than `SYMBOL_LEN - 1` bytes are truncated on construction.
pub const SYMBOL_LEN: usize = 16;

/// Order / trade side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// The side the order matches against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// What an ingress event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    /// A book level update, applied to the book as a limit order.
    BookLevel = 0,
    /// An externally observed trade, fed straight to histories/strategies.
    Trade = 1,
}

impl EventKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(EventKind::BookLevel),
            1 => Some(EventKind::Trade),
            _ => None,
        }
    }
}

/// One market-data event from a producer.
///
/// Field meanings follow the wire record: `price` is the external (unscaled)
/// price, `quantity` is pre-scaled by the producer, `timestamp_ns` is the
/// producer's monotonic clock, and `order_id` is zero when the engine should
/// synthesise one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketDataEvent {
    pub symbol: [u8; SYMBOL_LEN],
    pub side: Side,
    pub kind: EventKind,
    pub price: f64,
    pub quantity: u64,
    pub timestamp_ns: u64,
    pub order_id: u64,
}

impl MarketDataEvent {
    pub fn new(
        symbol: &str,
        side: Side,
        kind: EventKind,
        price: f64,
        quantity: u64,
        timestamp_ns: u64,
        order_id: u64,
    ) -> Self {
        Self {
            symbol: pack_symbol(symbol),
            side,
            kind,
            price,
            quantity,
            timestamp_ns,
            order_id,
        }
    }

    /// Symbol as a string slice, with null padding stripped.
    pub fn symbol(&self) -> &str {
        let end = self
            .symbol
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(SYMBOL_LEN);
        std::str::from_utf8(&self.symbol[..end]).unwrap_or("")
    }
}

/// Null-pad (and if necessary truncate) a symbol into its wire buffer.
pub(crate) fn pack_symbol(symbol: &str) -> [u8; SYMBOL_LEN] {
    let mut buf = [0u8; SYMBOL_LEN];
    let bytes = symbol.as_bytes();
    let n = bytes.len().min(SYMBOL_LEN - 1);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

/// An executed or observed trade, in external price terms.
///
/// Fed to strategies via `on_trade` and kept in per-symbol histories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeInfo {
    pub price: f64,
    pub quantity: u64,
    pub side: Side,
    pub timestamp_ns: u64,
}
