//! Bounded lock-free SPSC ring of market-data events.
//!
//! One producer thread pushes, one consumer thread (the matching thread)
//! pops. Slots are fixed-size and `Copy`; neither operation blocks or
//! allocates. The ring keeps one slot empty so `next(tail) == head`
//! unambiguously means full.
//!
//! Memory ordering: the producer's release store on `tail` pairs with the
//! consumer's acquire load, guaranteeing the consumer observes the event
//! bytes written before the cursor advanced; symmetrically for `head` on
//! the pop side so the producer never overwrites an unread slot.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use quantumflow_models::MarketDataEvent;

/// Default slot count (one slot of which stays empty).
pub const DEFAULT_RING_CAPACITY: usize = 4096;

struct RingInner {
    slots: Box<[UnsafeCell<MaybeUninit<MarketDataEvent>>]>,
    mask: usize,
    /// Consumer cursor: next slot to pop.
    head: CachePadded<AtomicUsize>,
    /// Producer cursor: next slot to fill.
    tail: CachePadded<AtomicUsize>,
    /// Push attempts, successful or not.
    push_count: AtomicU64,
    pop_count: AtomicU64,
    drop_count: AtomicU64,
}

// Slots are only written by the producer handle and read by the consumer
// handle, with the head/tail protocol keeping the two on disjoint slots.
unsafe impl Sync for RingInner {}
unsafe impl Send for RingInner {}

/// Observable ring counters. `push_count - drop_count - pop_count` equals
/// the number of events currently queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStats {
    pub push_count: u64,
    pub pop_count: u64,
    pub drop_count: u64,
    pub size: usize,
}

/// Constructor namespace for the ring handle pair.
pub struct EventRing;

impl EventRing {
    /// Create a ring with `capacity` slots (rounded up to a power of two,
    /// minimum 2) and return the producer/consumer handle pair.
    ///
    /// Neither handle is `Clone`: single-producer single-consumer is
    /// enforced by ownership.
    pub fn with_capacity(capacity: usize) -> (RingProducer, RingConsumer) {
        let capacity = capacity.next_power_of_two().max(2);
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let inner = Arc::new(RingInner {
            slots,
            mask: capacity - 1,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            push_count: AtomicU64::new(0),
            pop_count: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
        });

        (
            RingProducer {
                inner: inner.clone(),
            },
            RingConsumer { inner },
        )
    }

    pub fn with_default_capacity() -> (RingProducer, RingConsumer) {
        Self::with_capacity(DEFAULT_RING_CAPACITY)
    }
}

impl RingInner {
    fn stats(&self) -> RingStats {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        RingStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            pop_count: self.pop_count.load(Ordering::Relaxed),
            drop_count: self.drop_count.load(Ordering::Relaxed),
            size: tail.wrapping_sub(head) & self.mask,
        }
    }
}

/// Producer half of the ring. Owned by the in-process producer thread.
pub struct RingProducer {
    inner: Arc<RingInner>,
}

impl RingProducer {
    /// Push one event. Returns `false` (and counts a drop) when the ring is
    /// full. Never blocks, never allocates.
    pub fn push(&self, event: MarketDataEvent) -> bool {
        let inner = &*self.inner;
        inner.push_count.fetch_add(1, Ordering::Relaxed);

        let tail = inner.tail.load(Ordering::Relaxed);
        let next = (tail + 1) & inner.mask;
        if next == inner.head.load(Ordering::Acquire) {
            inner.drop_count.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        unsafe {
            (*inner.slots[tail].get()).write(event);
        }
        inner.tail.store(next, Ordering::Release);
        true
    }

    pub fn stats(&self) -> RingStats {
        self.inner.stats()
    }
}

/// Consumer half of the ring. Owned by the matching thread.
pub struct RingConsumer {
    inner: Arc<RingInner>,
}

impl RingConsumer {
    /// Pop the oldest event, or `None` when the ring is empty.
    pub fn pop(&self) -> Option<MarketDataEvent> {
        let inner = &*self.inner;
        let head = inner.head.load(Ordering::Relaxed);
        if head == inner.tail.load(Ordering::Acquire) {
            return None;
        }

        let event = unsafe { (*inner.slots[head].get()).assume_init() };
        inner.head.store((head + 1) & inner.mask, Ordering::Release);
        inner.pop_count.fetch_add(1, Ordering::Relaxed);
        Some(event)
    }

    pub fn is_empty(&self) -> bool {
        let inner = &*self.inner;
        inner.head.load(Ordering::Relaxed) == inner.tail.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> RingStats {
        self.inner.stats()
    }
}
