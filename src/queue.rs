use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crossbeam::utils::CachePadded;

use crate::error::PushError;
use crate::job::Job;
use crate::{PoolError, Result};

/// The queue a [`WorkerPool`](crate::WorkerPool) feeds its workers from.
pub type JobQueue = BoundedQueue<Job>;

/// A fixed-capacity, thread-safe FIFO queue.
///
/// Pushing never blocks: a full queue rejects the item and hands it back
/// inside [`PushError::Full`]. Popping blocks while the queue is empty,
/// woken by exactly one notification per successful push.
///
/// Closing the queue rejects further pushes; pops drain what is left and
/// then return `None`.
pub struct BoundedQueue<T> {
    /// Ring bookkeeping, on its own cache line.
    ring: CachePadded<Mutex<Ring<T>>>,
    /// Signalled once per push, and broadcast on close.
    not_empty: CachePadded<Condvar>,
    capacity: usize,
}

/// Circular buffer state. Only ever touched under the queue's mutex.
struct Ring<T> {
    slots: Box<[Option<T>]>,
    /// Oldest unconsumed slot.
    front: usize,
    /// Next free slot.
    rear: usize,
    /// Occupied slots, `0..=slots.len()`.
    count: usize,
    closed: bool,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Ring {
            slots: (0..capacity).map(|_| None).collect(),
            front: 0,
            rear: 0,
            count: 0,
            closed: false,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Caller checks `!is_full()` first.
    fn put_rear(&mut self, item: T) {
        self.slots[self.rear] = Some(item);
        self.rear = (self.rear + 1) % self.capacity();
        self.count += 1;
    }

    fn take_front(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.front].take();
        self.front = (self.front + 1) % self.capacity();
        self.count -= 1;
        item
    }
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity(capacity));
        }
        Ok(BoundedQueue {
            ring: CachePadded::new(Mutex::new(Ring::with_capacity(capacity))),
            not_empty: CachePadded::new(Condvar::new()),
            capacity,
        })
    }

    /// Appends `item` to the back of the queue without blocking.
    ///
    /// On success one waiting consumer, if any, is woken. On failure the
    /// queue is left untouched and the item is returned in the error.
    pub fn push(&self, item: T) -> std::result::Result<(), PushError<T>> {
        let mut ring = self.lock();
        if ring.closed {
            return Err(PushError::Closed(item));
        }
        if ring.is_full() {
            return Err(PushError::Full(item));
        }
        ring.put_rear(item);
        drop(ring);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` only once the queue has been closed and drained; an
    /// open queue blocks here for as long as no producer pushes.
    pub fn pop(&self) -> Option<T> {
        let mut ring = self.lock();
        // Another consumer may have raced us to the item we were woken for.
        while ring.count == 0 {
            if ring.closed {
                return None;
            }
            ring = self
                .not_empty
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }
        ring.take_front()
    }

    /// Removes the oldest item if there is one, without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().take_front()
    }

    /// Closes the queue and wakes every blocked consumer.
    pub fn close(&self) {
        let mut ring = self.lock();
        if ring.closed {
            return;
        }
        ring.closed = true;
        drop(ring);
        self.not_empty.notify_all();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.lock().count
    }

    /// Returns `true` if no item is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the next push would be rejected as full.
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Nothing panics while the ring is locked, so a poisoned lock still
    // guards consistent state.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
