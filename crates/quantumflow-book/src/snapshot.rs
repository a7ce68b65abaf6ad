//! Immutable book snapshots for strategies and telemetry.

use serde::Serialize;

use quantumflow_models::PriceConverter;

use crate::book::Book;

/// One aggregated price level, in external price terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapshotLevel {
    pub price: f64,
    pub quantity: u64,
    pub order_count: u64,
}

/// A value copy of a book's public state at an instant.
///
/// Bids are ordered descending, asks ascending. Best bid/ask and mid are
/// re-derived from the walked sides so the snapshot is internally
/// consistent even if the book mutates afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<SnapshotLevel>,
    pub asks: Vec<SnapshotLevel>,
    pub best_bid: f64,
    pub best_ask: f64,
    pub mid_price: f64,
    /// Capture instant; carried at the telemetry frame level, not in the
    /// serialised payload.
    #[serde(skip_serializing)]
    pub timestamp_ns: u64,
}

impl BookSnapshot {
    /// Materialise a snapshot in O(levels). The caller stamps
    /// `timestamp_ns` (the engine uses its tick clock).
    pub fn from_book(book: &Book, symbol: &str, converter: &PriceConverter) -> Self {
        let bids: Vec<SnapshotLevel> = book
            .iter_bids()
            .map(|level| SnapshotLevel {
                price: converter.to_external(level.price()),
                quantity: level.total_volume(),
                order_count: level.order_count(),
            })
            .collect();
        let asks: Vec<SnapshotLevel> = book
            .iter_asks()
            .map(|level| SnapshotLevel {
                price: converter.to_external(level.price()),
                quantity: level.total_volume(),
                order_count: level.order_count(),
            })
            .collect();

        let best_bid = bids.first().map(|l| l.price).unwrap_or(0.0);
        let best_ask = asks.first().map(|l| l.price).unwrap_or(0.0);
        let mid_price = if best_bid > 0.0 && best_ask > 0.0 {
            (best_bid + best_ask) / 2.0
        } else {
            0.0
        };

        Self {
            symbol: symbol.to_string(),
            bids,
            asks,
            best_bid,
            best_ask,
            mid_price,
            timestamp_ns: 0,
        }
    }
}
