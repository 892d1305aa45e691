//! Price-time priority limit order book for one instrument.
//!
//! Holds two circular rings of [`PriceLevel`]s (one per side, sorted by
//! aggressiveness), a direct-indexed `price -> level` table, and a
//! two-level direct-indexed `(client_id, client_order_id) -> order`
//! table for O(1) cancel lookup. All state lives in two [`Pool`]s —
//! nothing here allocates on the heap once constructed.
//!
//! `Add` and `Cancel` are the only entry points, and both are atomic
//! from an external observer's perspective: every response and market
//! update they emit is delivered via the `on_response`/`on_update`
//! callbacks in the exact order called out below, before the call
//! returns.

use crate::order::{ring_push_back, ring_remove, Order};
use crate::pool::{Pool, PoolIndex, NULL_INDEX};
use crate::price_level::{insert_level, remove_level, PriceLevel};
use crate::types::{
    ClientId, ClientResponseType, MarketUpdateType, MeClientRequest, MeClientResponse,
    MeMarketUpdate, OrderId, Price, Qty, Side, TickerId, INVALID_ORDER_ID, INVALID_PRIORITY,
    INVALID_QTY,
};

/// Capacities an [`OrderBook`] is built with. All are hard limits: a
/// request that would exceed `max_clients`/`max_order_ids` is rejected
/// (Cancel) or is a precondition violation (Add — the gateway is
/// trusted to have validated these before the request reaches here).
#[derive(Clone, Copy, Debug)]
pub struct OrderBookConfig {
    pub ticker_id: TickerId,
    pub max_price_levels: usize,
    pub max_clients: usize,
    pub max_order_ids: usize,
    pub order_pool_capacity: u32,
    pub level_pool_capacity: u32,
}

/// Maps a validated, positive price into its direct-indexed table slot.
#[inline]
fn price_slot(price: Price, modulus: usize) -> usize {
    (price as usize) % modulus
}

pub struct OrderBook {
    ticker_id: TickerId,
    bids_by_price: PoolIndex,
    asks_by_price: PoolIndex,
    price_table: Vec<PoolIndex>,
    cid_oid_to_order: Vec<Vec<PoolIndex>>,
    next_market_order_id: OrderId,
    orders: Pool<Order>,
    levels: Pool<PriceLevel>,
    max_price_levels: usize,
    max_clients: usize,
    max_order_ids: usize,
}

impl OrderBook {
    pub fn new(config: OrderBookConfig) -> Self {
        Self {
            ticker_id: config.ticker_id,
            bids_by_price: NULL_INDEX,
            asks_by_price: NULL_INDEX,
            price_table: vec![NULL_INDEX; config.max_price_levels],
            cid_oid_to_order: vec![vec![NULL_INDEX; config.max_order_ids]; config.max_clients],
            next_market_order_id: 1,
            orders: Pool::new(config.order_pool_capacity),
            levels: Pool::new(config.level_pool_capacity),
            max_price_levels: config.max_price_levels,
            max_clients: config.max_clients,
            max_order_ids: config.max_order_ids,
        }
    }

    pub fn ticker_id(&self) -> TickerId {
        self.ticker_id
    }

    pub fn best_bid_price(&self) -> Option<Price> {
        (self.bids_by_price != NULL_INDEX).then(|| self.levels.get(self.bids_by_price).price)
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        (self.asks_by_price != NULL_INDEX).then(|| self.levels.get(self.asks_by_price).price)
    }

    pub fn resting_order_count(&self) -> u32 {
        self.orders.allocated()
    }

    pub fn price_level_count(&self) -> u32 {
        self.levels.allocated()
    }

    pub fn next_market_order_id(&self) -> OrderId {
        self.next_market_order_id
    }

    /// A cheap, order-sensitive summary of book state — not a
    /// cryptographic digest, just enough to compare two independently
    /// replayed runs for exact agreement in tests.
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.best_bid_price().hash(&mut hasher);
        self.best_ask_price().hash(&mut hasher);
        self.resting_order_count().hash(&mut hasher);
        self.price_level_count().hash(&mut hasher);
        self.next_market_order_id.hash(&mut hasher);
        hasher.finish()
    }

    fn level_for_price(&self, side: Side, price: Price) -> Option<PoolIndex> {
        let idx = self.price_table[price_slot(price, self.max_price_levels)];
        if idx == NULL_INDEX {
            return None;
        }
        let level = self.levels.get(idx);
        (level.side == side && level.price == price).then_some(idx)
    }

    fn side_head(&self, side: Side) -> PoolIndex {
        match side {
            Side::Buy => self.bids_by_price,
            Side::Sell => self.asks_by_price,
            Side::Invalid => unreachable!("order book: side_head requires a valid side"),
        }
    }

    fn side_head_mut(&mut self, side: Side) -> &mut PoolIndex {
        match side {
            Side::Buy => &mut self.bids_by_price,
            Side::Sell => &mut self.asks_by_price,
            Side::Invalid => unreachable!("order book: side_head_mut requires a valid side"),
        }
    }

    fn create_level(&mut self, side: Side, price: Price) -> PoolIndex {
        let level_idx = self.levels.allocate(PriceLevel {
            side,
            price,
            first_order: NULL_INDEX,
            prev_entry: NULL_INDEX,
            next_entry: NULL_INDEX,
        });
        insert_level(&mut self.levels, self.side_head_mut(side), level_idx);
        self.price_table[price_slot(price, self.max_price_levels)] = level_idx;
        level_idx
    }

    /// Unlinks and frees `order_idx`, and — if that empties its level —
    /// unlinks and frees the level too. Does not emit any response or
    /// update; callers emit those themselves since the exact `CANCEL`
    /// vs. `MODIFY` choice depends on why the order is being removed.
    fn remove_order(&mut self, order_idx: PoolIndex) {
        let (side, price, client_id, client_order_id) = {
            let o = self.orders.get(order_idx);
            (o.side, o.price, o.client_id, o.client_order_id)
        };

        let level_idx = self
            .level_for_price(side, price)
            .expect("order book: resting order has no matching price level");

        {
            let level = self.levels.get_mut(level_idx);
            ring_remove(&mut self.orders, &mut level.first_order, order_idx);
        }

        self.cid_oid_to_order[client_id as usize][client_order_id as usize] = NULL_INDEX;
        self.orders.deallocate(order_idx);

        if self.levels.get(level_idx).first_order == NULL_INDEX {
            remove_level(&mut self.levels, self.side_head_mut(side), level_idx);
            self.price_table[price_slot(price, self.max_price_levels)] = NULL_INDEX;
            self.levels.deallocate(level_idx);
        }
    }

    /// Validates an inbound `Add`. All failures here are fatal: the
    /// gateway is trusted to have already validated the message frame,
    /// so a malformed request reaching the book is a precondition
    /// violation, not a business error.
    fn validate_add(&self, req: &MeClientRequest) {
        assert_eq!(
            req.ticker_id, self.ticker_id,
            "order book: Add routed to the wrong book (got ticker {}, book is {})",
            req.ticker_id, self.ticker_id
        );
        assert!(
            req.side.is_valid(),
            "order book: Add requires a valid side, got {:?}",
            req.side
        );
        assert!(
            req.qty > 0 && req.qty != INVALID_QTY,
            "order book: Add requires qty > 0, got {}",
            req.qty
        );
        assert!(
            req.price > 0 && req.price != crate::types::INVALID_PRICE,
            "order book: Add requires a positive price, got {}",
            req.price
        );
        assert!(
            (req.client_id as usize) < self.max_clients,
            "order book: client_id {} exceeds configured capacity {}",
            req.client_id,
            self.max_clients
        );
        assert!(
            (req.order_id as usize) < self.max_order_ids,
            "order book: client_order_id {} exceeds configured capacity {}",
            req.order_id,
            self.max_order_ids
        );
    }

    /// `Add(client_id, client_order_id, ticker_id, side, price, qty)`.
    ///
    /// Assigns a market order id, emits `ACCEPTED`, crosses the book via
    /// `CheckForMatch`, and — if residual quantity remains — rests the
    /// order and emits `ADD` with its assigned priority.
    pub fn add(
        &mut self,
        req: &MeClientRequest,
        mut on_response: impl FnMut(&MeClientResponse),
        mut on_update: impl FnMut(&MeMarketUpdate),
    ) {
        self.validate_add(req);

        let market_order_id = self.next_market_order_id;
        self.next_market_order_id += 1;

        on_response(&MeClientResponse {
            kind: ClientResponseType::Accepted,
            client_id: req.client_id,
            ticker_id: req.ticker_id,
            client_order_id: req.order_id,
            market_order_id,
            side: req.side,
            price: req.price,
            exec_qty: 0,
            leaves_qty: req.qty,
        });

        let mut leaves_qty = req.qty;
        self.check_for_match(
            req.client_id,
            req.order_id,
            market_order_id,
            req.side,
            req.price,
            &mut leaves_qty,
            &mut on_response,
            &mut on_update,
        );

        if leaves_qty == 0 {
            return;
        }

        let level_idx = self
            .level_for_price(req.side, req.price)
            .unwrap_or_else(|| self.create_level(req.side, req.price));

        let priority = {
            let level = self.levels.get(level_idx);
            if level.first_order == NULL_INDEX {
                1
            } else {
                let tail = self.orders.get(level.first_order).prev;
                self.orders.get(tail).priority + 1
            }
        };

        let order_idx = self.orders.allocate(Order {
            ticker_id: req.ticker_id,
            client_id: req.client_id,
            client_order_id: req.order_id,
            market_order_id,
            side: req.side,
            price: req.price,
            qty: leaves_qty,
            priority,
            prev: NULL_INDEX,
            next: NULL_INDEX,
        });

        {
            let level = self.levels.get_mut(level_idx);
            ring_push_back(&mut self.orders, &mut level.first_order, order_idx);
        }
        self.cid_oid_to_order[req.client_id as usize][req.order_id as usize] = order_idx;

        on_update(&MeMarketUpdate {
            kind: MarketUpdateType::Add,
            order_id: market_order_id,
            ticker_id: req.ticker_id,
            side: req.side,
            price: req.price,
            qty: leaves_qty,
            priority,
        });
    }

    /// Walks the opposite side from its best level while the aggressor
    /// still has residual quantity and the current best level crosses,
    /// matching FIFO against each level's head order.
    #[allow(clippy::too_many_arguments)]
    fn check_for_match(
        &mut self,
        aggressor_client_id: ClientId,
        aggressor_client_order_id: OrderId,
        aggressor_market_order_id: OrderId,
        aggressor_side: Side,
        aggressor_price: Price,
        leaves_qty: &mut Qty,
        on_response: &mut impl FnMut(&MeClientResponse),
        on_update: &mut impl FnMut(&MeMarketUpdate),
    ) {
        let opposite_side = match aggressor_side {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::Invalid => {
                unreachable!("order book: CheckForMatch requires a valid aggressor side")
            }
        };

        loop {
            if *leaves_qty == 0 {
                break;
            }

            let side_head = self.side_head(opposite_side);
            if side_head == NULL_INDEX {
                break;
            }

            let level_price = self.levels.get(side_head).price;
            let crosses = match aggressor_side {
                Side::Buy => aggressor_price >= level_price,
                Side::Sell => aggressor_price <= level_price,
                Side::Invalid => unreachable!(),
            };
            if !crosses {
                break;
            }

            let resting_idx = self.levels.get(side_head).first_order;
            debug_assert_ne!(
                resting_idx, NULL_INDEX,
                "order book: a non-empty price level must have a first_order"
            );

            let (resting_client_id, resting_client_order_id, resting_market_order_id, resting_qty) = {
                let o = self.orders.get(resting_idx);
                (o.client_id, o.client_order_id, o.market_order_id, o.qty)
            };

            let fill_qty = (*leaves_qty).min(resting_qty);
            *leaves_qty -= fill_qty;
            let new_resting_qty = resting_qty - fill_qty;
            self.orders.get_mut(resting_idx).qty = new_resting_qty;

            on_response(&MeClientResponse {
                kind: ClientResponseType::Filled,
                client_id: aggressor_client_id,
                ticker_id: self.ticker_id,
                client_order_id: aggressor_client_order_id,
                market_order_id: aggressor_market_order_id,
                side: aggressor_side,
                price: level_price,
                exec_qty: fill_qty,
                leaves_qty: *leaves_qty,
            });
            on_response(&MeClientResponse {
                kind: ClientResponseType::Filled,
                client_id: resting_client_id,
                ticker_id: self.ticker_id,
                client_order_id: resting_client_order_id,
                market_order_id: resting_market_order_id,
                side: opposite_side,
                price: level_price,
                exec_qty: fill_qty,
                leaves_qty: new_resting_qty,
            });
            on_update(&MeMarketUpdate {
                kind: MarketUpdateType::Trade,
                order_id: INVALID_ORDER_ID,
                ticker_id: self.ticker_id,
                side: aggressor_side,
                price: level_price,
                qty: fill_qty,
                priority: INVALID_PRIORITY,
            });

            if new_resting_qty == 0 {
                on_update(&MeMarketUpdate {
                    kind: MarketUpdateType::Cancel,
                    order_id: resting_market_order_id,
                    ticker_id: self.ticker_id,
                    side: opposite_side,
                    price: level_price,
                    qty: 0,
                    priority: INVALID_PRIORITY,
                });
                self.remove_order(resting_idx);
            } else {
                let priority = self.orders.get(resting_idx).priority;
                on_update(&MeMarketUpdate {
                    kind: MarketUpdateType::Modify,
                    order_id: resting_market_order_id,
                    ticker_id: self.ticker_id,
                    side: opposite_side,
                    price: level_price,
                    qty: new_resting_qty,
                    priority,
                });
            }
        }
    }

    /// `Cancel(client_id, order_id, ticker_id)`. A lookup miss is a
    /// business reject (`CANCEL_REJECTED`), never fatal — an unknown or
    /// already-filled order is an expected race between a client's
    /// cancel and the matcher, not a protocol violation.
    pub fn cancel(
        &mut self,
        client_id: ClientId,
        order_id: OrderId,
        ticker_id: TickerId,
        mut on_response: impl FnMut(&MeClientResponse),
        mut on_update: impl FnMut(&MeMarketUpdate),
    ) {
        assert_eq!(
            ticker_id, self.ticker_id,
            "order book: Cancel routed to the wrong book (got ticker {}, book is {})",
            ticker_id, self.ticker_id
        );

        let in_bounds = (client_id as usize) < self.max_clients && (order_id as usize) < self.max_order_ids;
        let order_idx = in_bounds
            .then(|| self.cid_oid_to_order[client_id as usize][order_id as usize])
            .filter(|&idx| idx != NULL_INDEX);

        let order_idx = match order_idx {
            Some(idx) => idx,
            None => {
                on_response(&MeClientResponse {
                    kind: ClientResponseType::CancelRejected,
                    client_id,
                    ticker_id,
                    client_order_id: order_id,
                    ..MeClientResponse::default()
                });
                return;
            }
        };

        let (market_order_id, side, price, qty, priority) = {
            let o = self.orders.get(order_idx);
            (o.market_order_id, o.side, o.price, o.qty, o.priority)
        };

        on_response(&MeClientResponse {
            kind: ClientResponseType::Canceled,
            client_id,
            ticker_id,
            client_order_id: order_id,
            market_order_id,
            side,
            price,
            exec_qty: 0,
            leaves_qty: qty,
        });
        on_update(&MeMarketUpdate {
            kind: MarketUpdateType::Cancel,
            order_id: market_order_id,
            ticker_id,
            side,
            price,
            qty,
            priority,
        });

        self.remove_order(order_idx);
    }
}
