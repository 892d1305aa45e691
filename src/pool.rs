//! Typed fixed pool — O(1) amortized allocate/free of a preallocated,
//! homogeneous block. Backs every hot-path allocation (orders, price
//! levels, log records).
//!
//! Unlike a free-list allocator, this pool tracks a single rolling
//! "next free slot" cursor: allocation always happens at the cursor,
//! which then walks forward (wrapping) until it lands on another free
//! slot. Worst case O(N) (a nearly-full pool), amortized O(1) under
//! steady churn. `deallocate` never touches the cursor — it only clears
//! the slot's free bit, so a freed slot is picked up whenever the
//! cursor's next lap reaches it, not necessarily on the very next
//! `allocate`.
//!
//! One consequence of "the cursor always advances past occupied slots
//! or dies trying": a pool of capacity `N` can never actually hold `N`
//! live objects at once. Filling the last slot makes the post-write
//! cursor advance lap every other slot and find none free, which is
//! fatal. Callers must size pool capacity to strictly exceed peak live
//! count.
//!
//! Handles are `u32` slot indices rather than raw pointers — the
//! arena-index style for a cyclic intrusive list in safe Rust.

use std::fmt;

/// Sentinel handle meaning "no slot" (the null index).
pub const NULL_INDEX: u32 = u32::MAX;

pub type PoolIndex = u32;

struct Slot<T> {
    value: T,
    free: bool,
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    next_free_index: usize,
    allocated: u32,
    capacity: u32,
}

impl<T: Default> Pool<T> {
    /// Preallocates `capacity` default-valued slots.
    ///
    /// # Panics
    /// Panics if `capacity` is 0 or would collide with [`NULL_INDEX`].
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "pool capacity must be positive");
        assert!(capacity < NULL_INDEX, "pool capacity must be less than NULL_INDEX");

        let mut slots = Vec::with_capacity(capacity as usize);
        slots.resize_with(capacity as usize, || Slot {
            value: T::default(),
            free: true,
        });

        Self {
            slots,
            next_free_index: 0,
            allocated: 0,
            capacity,
        }
    }

    /// Allocates a slot, writes `value` into it, and returns its handle.
    ///
    /// # Panics
    /// Fatal if the cursor lands on an occupied slot (the pool was sized
    /// without headroom) or if advancing the cursor afterward finds no
    /// free slot anywhere (the pool is now exactly full).
    #[inline]
    pub fn allocate(&mut self, value: T) -> PoolIndex {
        let idx = self.next_free_index;
        assert!(
            self.slots[idx].free,
            "pool exhausted: cursor landed on an occupied slot (capacity={})",
            self.capacity
        );

        self.slots[idx].value = value;
        self.slots[idx].free = false;
        self.allocated += 1;

        self.advance_next_free_index();

        idx as PoolIndex
    }

    fn advance_next_free_index(&mut self) {
        let n = self.slots.len();
        let initial = self.next_free_index;
        loop {
            self.next_free_index = (self.next_free_index + 1) % n;
            if self.slots[self.next_free_index].free {
                return;
            }
            assert!(
                self.next_free_index != initial,
                "pool exhausted: no free slot after a full lap (capacity={})",
                self.capacity
            );
        }
    }

    /// Returns a slot to the pool. Does not move the allocation cursor.
    ///
    /// # Panics
    /// Fatal on double-free or on an out-of-range index.
    #[inline]
    pub fn deallocate(&mut self, index: PoolIndex) {
        let idx = index as usize;
        assert!(idx < self.slots.len(), "pool index out of bounds: {index}");
        assert!(!self.slots[idx].free, "double free at pool index {index}");

        self.slots[idx].value = T::default();
        self.slots[idx].free = true;
        self.allocated -= 1;
    }

    #[inline]
    pub fn get(&self, index: PoolIndex) -> &T {
        &self.slots[index as usize].value
    }

    #[inline]
    pub fn get_mut(&mut self, index: PoolIndex) -> &mut T {
        &mut self.slots[index as usize].value
    }

    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity)
            .field("allocated", &self.allocated)
            .field("next_free_index", &self.next_free_index)
            .finish()
    }
}
