//! Resting order records and the circular intrusive FIFO that chains all
//! orders resting at one price level.
//!
//! `prev`/`next` are pool indices rather than pointers — see
//! [`crate::pool`]. The ring is circular: walking `next` from the head
//! eventually returns to the head, and `head.prev` is the newest order
//! (the one that would be appended next).

use crate::pool::{Pool, PoolIndex, NULL_INDEX};
use crate::types::{ClientId, OrderId, Price, Priority, Qty, Side, TickerId};

/// One resting order. Lives in an [`Pool<Order>`] for the lifetime
/// between `Add` (when residual quantity remains after matching) and
/// either a full fill or a `Cancel`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Order {
    pub ticker_id: TickerId,
    pub client_id: ClientId,
    pub client_order_id: OrderId,
    pub market_order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
    pub priority: Priority,
    /// Sibling link within this price level's FIFO ring.
    pub prev: PoolIndex,
    /// Sibling link within this price level's FIFO ring.
    pub next: PoolIndex,
}

/// Appends `order_idx` to the tail of the ring whose head is
/// `*first_order` (updated in place). Assigns no priority — the caller
/// has already stamped `priority` before calling this.
///
/// # Complexity
/// O(1).
pub fn ring_push_back(pool: &mut Pool<Order>, first_order: &mut PoolIndex, order_idx: PoolIndex) {
    if *first_order == NULL_INDEX {
        pool.get_mut(order_idx).prev = order_idx;
        pool.get_mut(order_idx).next = order_idx;
        *first_order = order_idx;
        return;
    }

    let head = *first_order;
    let tail = pool.get(head).prev;

    pool.get_mut(tail).next = order_idx;
    pool.get_mut(order_idx).prev = tail;
    pool.get_mut(order_idx).next = head;
    pool.get_mut(head).prev = order_idx;
}

/// Unlinks `order_idx` from the ring whose head is `*first_order`
/// (updated in place, becoming `NULL_INDEX` if the ring is now empty).
///
/// # Complexity
/// O(1).
pub fn ring_remove(pool: &mut Pool<Order>, first_order: &mut PoolIndex, order_idx: PoolIndex) {
    let (prev, next) = {
        let order = pool.get(order_idx);
        (order.prev, order.next)
    };

    if next == order_idx {
        // Singleton: removing the only order empties the level.
        debug_assert_eq!(*first_order, order_idx);
        *first_order = NULL_INDEX;
        return;
    }

    pool.get_mut(prev).next = next;
    pool.get_mut(next).prev = prev;
    if *first_order == order_idx {
        *first_order = next;
    }
}
