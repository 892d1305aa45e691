//! Wait-free single-producer/single-consumer ring queue.
//!
//! Exactly one producer thread and one consumer thread may touch a given
//! queue. `write_index`/`read_index`/`count` are atomic; a release store
//! on `advance_write` paired with an acquire load on the read side
//! ensures the consumer observes a fully written slot before it reads it.
//! Overflow (producer lapping the consumer) is undefined behavior from a
//! correctness standpoint — callers size queues so it cannot happen in
//! steady state; this implementation does not attempt to detect it.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct SpscQueue<T> {
    slots: Box<[UnsafeCell<T>]>,
    capacity: usize,
    write_index: AtomicUsize,
    read_index: AtomicUsize,
    count: AtomicUsize,
}

// SAFETY: the type is only ever accessed from at most two threads — one
// producer calling next_write/advance_write, one consumer calling
// next_read/advance_read — coordinated through the atomics above.
unsafe impl<T: Send> Send for SpscQueue<T> {}
unsafe impl<T: Send> Sync for SpscQueue<T> {}

impl<T: Default> SpscQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "SPSC queue capacity must be positive");
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            capacity,
            write_index: AtomicUsize::new(0),
            read_index: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }
}

impl<T> SpscQueue<T> {
    /// Returns the slot the producer should write into in place. Only
    /// the producer thread may call this.
    #[inline]
    pub fn next_write(&self) -> &mut T {
        let idx = self.write_index.load(Ordering::Relaxed);
        // SAFETY: single producer; this slot is not concurrently read
        // until advance_write publishes it below.
        unsafe { &mut *self.slots[idx].get() }
    }

    /// Publishes the slot most recently returned by `next_write`. Only
    /// the producer thread may call this.
    #[inline]
    pub fn advance_write(&self) {
        let idx = self.write_index.load(Ordering::Relaxed);
        let next = (idx + 1) % self.capacity;
        self.write_index.store(next, Ordering::Relaxed);
        // Release: publishes the just-written slot to the consumer.
        self.count.fetch_add(1, Ordering::Release);
    }

    /// Returns the next unread slot, or `None` if the queue is empty.
    /// Only the consumer thread may call this.
    #[inline]
    pub fn next_read(&self) -> Option<&mut T> {
        // Acquire: synchronizes with the producer's release on count, so
        // a non-zero count guarantees the slot's contents are visible.
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }
        let idx = self.read_index.load(Ordering::Relaxed);
        // SAFETY: single consumer; count > 0 means the producer has
        // published this slot and will not touch it again until after
        // advance_read.
        Some(unsafe { &mut *self.slots[idx].get() })
    }

    /// Releases the slot most recently returned by `next_read` back to
    /// the producer. Only the consumer thread may call this.
    ///
    /// # Panics
    /// Fatal if called when the queue was empty — an under-read.
    #[inline]
    pub fn advance_read(&self) {
        let count = self.count.load(Ordering::Relaxed);
        assert!(count > 0, "SPSC queue under-read: advance_read on empty queue");

        let idx = self.read_index.load(Ordering::Relaxed);
        let next = (idx + 1) % self.capacity;
        self.read_index.store(next, Ordering::Relaxed);
        self.count.fetch_sub(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
