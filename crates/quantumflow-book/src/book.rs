//! The matching book: two price-keyed level maps plus an order-id index.
//!
//! Matching is price-time priority: an incoming order consumes opposite
//! levels best-first, oldest-first within each level, while its limit
//! crosses; any residual volume rests on its own side. Trades execute at
//! the resting maker's level price.

use std::collections::{BTreeMap, HashMap};

use quantumflow_models::{OrderId, Price, Side, Volume};

use crate::level::Level;
use crate::order::{Order, OrderKey, OrderStatus};
use crate::pool::OrderPool;

/// Default order-pool size per book. Callers with deeper books size the
/// pool explicitly via [`Book::with_pool_capacity`].
pub const DEFAULT_POOL_CAPACITY: usize = 1 << 16;

/// A single fill, priced at the maker's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub price: Price,
    pub volume: Volume,
}

#[derive(Debug)]
pub struct Book {
    bids: BTreeMap<Price, Level>,
    asks: BTreeMap<Price, Level>,
    pool: OrderPool,
    /// Active orders only: id → pool slot.
    index: HashMap<OrderId, OrderKey>,
    /// Terminal outcomes for ids no longer in the index.
    terminal: HashMap<OrderId, OrderStatus>,
}

impl Book {
    pub fn new() -> Self {
        Self::with_pool_capacity(DEFAULT_POOL_CAPACITY)
    }

    pub fn with_pool_capacity(capacity: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            pool: OrderPool::with_capacity(capacity),
            index: HashMap::new(),
            terminal: HashMap::new(),
        }
    }

    /// Match an incoming limit order and rest any remainder.
    ///
    /// Orders with zero price or zero volume are rejected: no trades, no
    /// rest, no state change. Returns fills in match order.
    ///
    /// # Panics
    /// On order-pool exhaustion. The pool is provisioned by the caller, so
    /// exhaustion is a sizing error; a partially applied order would be
    /// worse than stopping.
    pub fn place_order(
        &mut self,
        order_id: OrderId,
        agent_id: u64,
        side: Side,
        limit_price: Price,
        volume: Volume,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();
        if limit_price == 0 || volume == 0 {
            return trades;
        }

        let mut remaining = volume;

        // Consume crossing levels best-first, entirely, before advancing.
        while remaining > 0 {
            let crossed = match side {
                Side::Buy => self
                    .asks
                    .keys()
                    .next()
                    .copied()
                    .filter(|&best| best <= limit_price),
                Side::Sell => self
                    .bids
                    .keys()
                    .next_back()
                    .copied()
                    .filter(|&best| best >= limit_price),
            };
            let Some(level_price) = crossed else { break };

            let level = match side {
                Side::Buy => self.asks.get_mut(&level_price),
                Side::Sell => self.bids.get_mut(&level_price),
            };
            let Some(level) = level else { break };

            while remaining > 0 {
                let Some(maker_key) = level.head() else { break };

                let (fill, maker_id, maker_done) = {
                    let maker = self.pool.get_mut(maker_key);
                    let fill = maker.remaining_volume.min(remaining);
                    maker.fill(fill);
                    (fill, maker.id, maker.is_fulfilled())
                };

                remaining -= fill;
                level.reduce_volume(fill);
                trades.push(Trade {
                    taker_order_id: order_id,
                    maker_order_id: maker_id,
                    price: level_price,
                    volume: fill,
                });

                if maker_done {
                    level.pop_front(&mut self.pool);
                    self.pool.free(maker_key);
                    self.index.remove(&maker_id);
                    self.terminal.insert(maker_id, OrderStatus::Fulfilled);
                }
            }

            let level_emptied = level.is_empty();
            if level_emptied {
                match side {
                    Side::Buy => self.asks.remove(&level_price),
                    Side::Sell => self.bids.remove(&level_price),
                };
            }
        }

        if remaining > 0 {
            let order = Order::new(order_id, agent_id, side, limit_price, volume, remaining);
            let Some(key) = self.pool.alloc(order) else {
                panic!(
                    "order pool exhausted (capacity {}): pool must be sized for peak resting orders",
                    self.pool.capacity()
                );
            };
            let level = match side {
                Side::Buy => self
                    .bids
                    .entry(limit_price)
                    .or_insert_with(|| Level::new(limit_price)),
                Side::Sell => self
                    .asks
                    .entry(limit_price)
                    .or_insert_with(|| Level::new(limit_price)),
            };
            level.push_back(&mut self.pool, key);
            self.index.insert(order_id, key);
        } else {
            self.terminal.insert(order_id, OrderStatus::Fulfilled);
        }

        trades
    }

    /// Cancel a resting order. Unknown ids are a no-op.
    pub fn cancel(&mut self, order_id: OrderId) {
        let Some(key) = self.index.remove(&order_id) else {
            return;
        };

        let (side, price) = {
            let order = self.pool.get(key);
            (order.side, order.price)
        };

        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let mut remove_level = false;
        if let Some(level) = levels.get_mut(&price) {
            level.unlink(&mut self.pool, key);
            remove_level = level.is_empty();
        }
        if remove_level {
            levels.remove(&price);
        }

        self.pool.free(key);
        self.terminal.insert(order_id, OrderStatus::Cancelled);
    }

    /// Lifecycle state of an order this book has seen. `None` for ids it
    /// never saw.
    pub fn status(&self, order_id: OrderId) -> Option<OrderStatus> {
        if self.index.contains_key(&order_id) {
            return Some(OrderStatus::Active);
        }
        self.terminal.get(&order_id).copied()
    }

    /// Highest bid price, 0 when the bid side is empty.
    pub fn best_bid(&self) -> Price {
        self.bids.keys().next_back().copied().unwrap_or(0)
    }

    /// Lowest ask price, 0 when the ask side is empty.
    pub fn best_ask(&self) -> Price {
        self.asks.keys().next().copied().unwrap_or(0)
    }

    /// `best_ask - best_bid` when both sides are populated, else 0.
    pub fn spread(&self) -> Price {
        if self.bids.is_empty() || self.asks.is_empty() {
            return 0;
        }
        self.best_ask() - self.best_bid()
    }

    /// Midpoint in internal price units; 0.0 when either side is empty.
    pub fn mid_price(&self) -> f64 {
        if self.bids.is_empty() || self.asks.is_empty() {
            return 0.0;
        }
        (self.best_bid() as f64 + self.best_ask() as f64) / 2.0
    }

    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    pub fn resting_order_count(&self) -> usize {
        self.index.len()
    }

    /// Bid levels in price-priority order (descending).
    pub fn iter_bids(&self) -> impl Iterator<Item = &Level> {
        self.bids.values().rev()
    }

    /// Ask levels in price-priority order (ascending).
    pub fn iter_asks(&self) -> impl Iterator<Item = &Level> {
        self.asks.values()
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}
