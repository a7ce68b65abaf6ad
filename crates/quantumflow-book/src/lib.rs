//! Per-symbol price-time-priority limit order books.
//!
//! Orders live in a pool-backed arena; each price level is an intrusive
//! FIFO of pool slots; the book keys levels on the internal scaled price
//! (bids iterated descending, asks ascending) and keeps an order-id index
//! for O(1) cancellation.
//!
//! Everything here is single-threaded: books, pools and levels are owned
//! by the matching thread and need no synchronisation.

pub mod book;
pub mod level;
pub mod order;
pub mod pool;
pub mod snapshot;

pub use book::{Book, Trade, DEFAULT_POOL_CAPACITY};
pub use level::Level;
pub use order::{Order, OrderKey, OrderStatus};
pub use pool::OrderPool;
pub use snapshot::{BookSnapshot, SnapshotLevel};
