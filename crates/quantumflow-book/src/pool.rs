//! Capacity-capped arena for order records.
//!
//! Backed by a slab so freed slots are reused in O(1) and keys stay stable
//! while an order is alive. The cap makes exhaustion explicit: `alloc`
//! returns `None` instead of growing, and the book escalates that as a
//! fatal misconfiguration. Accessed only from the matching thread.

use slab::Slab;

use crate::order::{Order, OrderKey};

#[derive(Debug)]
pub struct OrderPool {
    slab: Slab<Order>,
    capacity: usize,
}

impl OrderPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),
            capacity,
        }
    }

    /// Place an order into a free slot. `None` when the pool is exhausted.
    pub fn alloc(&mut self, order: Order) -> Option<OrderKey> {
        if self.slab.len() >= self.capacity {
            return None;
        }
        Some(self.slab.insert(order))
    }

    /// Release a slot, returning the order that occupied it.
    pub fn free(&mut self, key: OrderKey) -> Order {
        self.slab.remove(key)
    }

    pub fn get(&self, key: OrderKey) -> &Order {
        &self.slab[key]
    }

    pub fn get_mut(&mut self, key: OrderKey) -> &mut Order {
        &mut self.slab[key]
    }

    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
