//! Price levels and the circular intrusive ring that chains all levels
//! on one side of a book, sorted by aggressiveness (best price first).
//!
//! Mirrors [`crate::order`]'s ring exactly, one level up: `prev_entry`/
//! `next_entry` are pool indices into a [`Pool<PriceLevel>`], and the
//! ring is circular — `side_head.prev_entry` is the least aggressive
//! (worst-priced) level on that side.

use crate::pool::{Pool, PoolIndex, NULL_INDEX};
use crate::types::{Price, Side};

/// All resting orders at one exact price, on one side.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceLevel {
    pub side: Side,
    pub price: Price,
    /// Head of the FIFO ring of orders at this level (see [`crate::order`]).
    pub first_order: PoolIndex,
    /// Sibling link within this side's level ring.
    pub prev_entry: PoolIndex,
    /// Sibling link within this side's level ring.
    pub next_entry: PoolIndex,
}

/// `true` if price `a` is strictly more aggressive than price `b` for
/// `side` — higher for `Buy`, lower for `Sell`.
///
/// # Panics
/// Fatal for `Side::Invalid`: a level never carries an invalid side.
fn is_more_aggressive(side: Side, a: Price, b: Price) -> bool {
    match side {
        Side::Buy => a > b,
        Side::Sell => a < b,
        Side::Invalid => unreachable!("price level carried an invalid side"),
    }
}

/// Splices `level_idx` into the ring rooted at `*side_head` (updated in
/// place), preserving sort order. Walking the ring stops on the second
/// visit to the head — a full lap — at which point the new level is the
/// least aggressive and belongs immediately before the head.
///
/// # Complexity
/// O(N) worst case in the number of distinct price levels on one side;
/// in practice levels are added near the best price, so this is closer
/// to O(1).
pub fn insert_level(pool: &mut Pool<PriceLevel>, side_head: &mut PoolIndex, level_idx: PoolIndex) {
    if *side_head == NULL_INDEX {
        pool.get_mut(level_idx).prev_entry = level_idx;
        pool.get_mut(level_idx).next_entry = level_idx;
        *side_head = level_idx;
        return;
    }

    let side = pool.get(level_idx).side;
    let new_price = pool.get(level_idx).price;
    let head = *side_head;

    let mut cursor = head;
    let mut insert_before = None;
    loop {
        let cursor_price = pool.get(cursor).price;
        if is_more_aggressive(side, new_price, cursor_price) {
            insert_before = Some(cursor);
            break;
        }
        let next = pool.get(cursor).next_entry;
        if next == head {
            break;
        }
        cursor = next;
    }

    let before = insert_before.unwrap_or(head);
    let after = pool.get(before).prev_entry;

    pool.get_mut(after).next_entry = level_idx;
    pool.get_mut(level_idx).prev_entry = after;
    pool.get_mut(level_idx).next_entry = before;
    pool.get_mut(before).prev_entry = level_idx;

    if before == head && insert_before.is_some() {
        *side_head = level_idx;
    }
}

/// Unlinks `level_idx` from the ring rooted at `*side_head` (updated in
/// place, becoming `NULL_INDEX` if the side is now empty).
pub fn remove_level(pool: &mut Pool<PriceLevel>, side_head: &mut PoolIndex, level_idx: PoolIndex) {
    let (prev, next) = {
        let level = pool.get(level_idx);
        (level.prev_entry, level.next_entry)
    };

    if next == level_idx {
        debug_assert_eq!(*side_head, level_idx);
        *side_head = NULL_INDEX;
        return;
    }

    pool.get_mut(prev).next_entry = next;
    pool.get_mut(next).prev_entry = prev;
    if *side_head == level_idx {
        *side_head = next;
    }
}

/// Walks the side's level ring from `side_head`, collecting `(price, order_count)`
/// pairs in ring order. Test/diagnostic helper only — not on the hot path.
#[cfg(test)]
pub fn collect_prices(pool: &Pool<PriceLevel>, side_head: PoolIndex) -> Vec<Price> {
    let mut out = Vec::new();
    if side_head == NULL_INDEX {
        return out;
    }
    let mut cursor = side_head;
    loop {
        out.push(pool.get(cursor).price);
        cursor = pool.get(cursor).next_entry;
        if cursor == side_head {
            break;
        }
    }
    out
}
