//! One price level: a FIFO of resting orders at an exact price.
//!
//! The FIFO is intrusive: orders carry `prev`/`next` slot keys, so
//! removal by key is O(1) without scanning. Aggregates are maintained
//! incrementally: `total_volume` tracks the sum of remaining volumes,
//! `order_count` the queue length. The level never frees pool slots; the
//! book owns order lifecycle.

use quantumflow_models::{Price, Volume};

use crate::order::OrderKey;
use crate::pool::OrderPool;

#[derive(Debug)]
pub struct Level {
    price: Price,
    head: Option<OrderKey>,
    tail: Option<OrderKey>,
    total_volume: Volume,
    order_count: u64,
}

impl Level {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            total_volume: 0,
            order_count: 0,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Oldest order at this price, next in line to be matched.
    pub fn head(&self) -> Option<OrderKey> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    pub fn total_volume(&self) -> Volume {
        self.total_volume
    }

    pub fn order_count(&self) -> u64 {
        self.order_count
    }

    /// Append an order, preserving time priority.
    pub fn push_back(&mut self, pool: &mut OrderPool, key: OrderKey) {
        let prev_tail = self.tail;
        {
            let order = pool.get_mut(key);
            order.prev = prev_tail;
            order.next = None;
            self.total_volume += order.remaining_volume;
        }
        if let Some(t) = prev_tail {
            pool.get_mut(t).next = Some(key);
        } else {
            self.head = Some(key);
        }
        self.tail = Some(key);
        self.order_count += 1;
    }

    /// Remove the oldest order. Returns its key without freeing the slot.
    pub fn pop_front(&mut self, pool: &mut OrderPool) -> Option<OrderKey> {
        let key = self.head?;
        self.unlink(pool, key);
        Some(key)
    }

    /// Remove an order anywhere in the queue in O(1) via its links.
    /// The order's current remaining volume leaves the aggregate.
    pub fn unlink(&mut self, pool: &mut OrderPool, key: OrderKey) {
        let (prev, next, remaining) = {
            let order = pool.get(key);
            (order.prev, order.next, order.remaining_volume)
        };

        match prev {
            Some(p) => pool.get_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => pool.get_mut(n).prev = prev,
            None => self.tail = prev,
        }
        {
            let order = pool.get_mut(key);
            order.prev = None;
            order.next = None;
        }

        self.total_volume -= remaining;
        self.order_count -= 1;
    }

    /// Account for a partial fill of an order still in the queue.
    pub fn reduce_volume(&mut self, volume: Volume) {
        self.total_volume -= volume;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use quantumflow_models::Side;

    fn push(level: &mut Level, pool: &mut OrderPool, id: u64, volume: Volume) -> OrderKey {
        let key = pool
            .alloc(Order::new(id, 1, Side::Buy, level.price(), volume, volume))
            .unwrap();
        level.push_back(pool, key);
        key
    }

    #[test]
    fn test_push_maintains_aggregates() {
        let mut pool = OrderPool::with_capacity(8);
        let mut level = Level::new(100);
        push(&mut level, &mut pool, 1, 50);
        push(&mut level, &mut pool, 2, 30);
        push(&mut level, &mut pool, 3, 20);

        assert_eq!(level.order_count(), 3);
        assert_eq!(level.total_volume(), 100);
    }

    #[test]
    fn test_fifo_order() {
        let mut pool = OrderPool::with_capacity(8);
        let mut level = Level::new(100);
        let k1 = push(&mut level, &mut pool, 1, 10);
        let k2 = push(&mut level, &mut pool, 2, 10);

        assert_eq!(level.head(), Some(k1));
        assert_eq!(level.pop_front(&mut pool), Some(k1));
        assert_eq!(level.head(), Some(k2));
        assert_eq!(level.pop_front(&mut pool), Some(k2));
        assert!(level.is_empty());
        assert_eq!(level.pop_front(&mut pool), None);
    }

    #[test]
    fn test_unlink_middle_order() {
        let mut pool = OrderPool::with_capacity(8);
        let mut level = Level::new(100);
        let k1 = push(&mut level, &mut pool, 1, 50);
        let k2 = push(&mut level, &mut pool, 2, 30);
        let k3 = push(&mut level, &mut pool, 3, 20);

        level.unlink(&mut pool, k2);

        assert_eq!(level.order_count(), 2);
        assert_eq!(level.total_volume(), 70);
        assert_eq!(level.head(), Some(k1));
        assert_eq!(pool.get(k1).next, Some(k3));
        assert_eq!(pool.get(k3).prev, Some(k1));
    }

    #[test]
    fn test_unlink_head_and_tail() {
        let mut pool = OrderPool::with_capacity(8);
        let mut level = Level::new(100);
        let k1 = push(&mut level, &mut pool, 1, 10);
        let k2 = push(&mut level, &mut pool, 2, 10);
        let k3 = push(&mut level, &mut pool, 3, 10);

        level.unlink(&mut pool, k1);
        assert_eq!(level.head(), Some(k2));

        level.unlink(&mut pool, k3);
        assert_eq!(level.head(), Some(k2));
        assert_eq!(pool.get(k2).next, None);
        assert_eq!(pool.get(k2).prev, None);
        assert_eq!(level.total_volume(), 10);
    }

    #[test]
    fn test_reduce_volume_tracks_partial_fills() {
        let mut pool = OrderPool::with_capacity(8);
        let mut level = Level::new(100);
        push(&mut level, &mut pool, 1, 50);

        level.reduce_volume(20);
        assert_eq!(level.total_volume(), 30);
        assert_eq!(level.order_count(), 1);
    }
}
