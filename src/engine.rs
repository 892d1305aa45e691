//! Matching engine: routes requests to the correct book and fans its
//! responses/market updates out onto the outbound SPSC queues.
//!
//! Owns an array of books indexed by `ticker_id`, one inbound queue of
//! client requests, and the two outbound queues. [`Engine::run`] spawns
//! the single dedicated worker thread (T2 in the thread model) that
//! drains the inbound queue until told to stop; [`Engine::process_one`]
//! is the synchronous entry point used by tests and benches that don't
//! want a background thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::book::{OrderBook, OrderBookConfig};
use crate::spsc::SpscQueue;
use crate::types::{ClientRequestType, MeClientRequest, MeClientResponse, MeMarketUpdate, TickerId};

#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub max_tickers: usize,
    pub inbound_capacity: usize,
    pub response_capacity: usize,
    pub market_update_capacity: usize,
}

pub struct Engine {
    books: Vec<Option<OrderBook>>,
    inbound: Arc<SpscQueue<MeClientRequest>>,
    responses: Arc<SpscQueue<MeClientResponse>>,
    market_updates: Arc<SpscQueue<MeMarketUpdate>>,
}

impl Engine {
    /// Builds one book per entry in `tickers`, using `book_config` to
    /// turn each ticker id into that book's capacities.
    ///
    /// # Panics
    /// Fatal if any ticker id in `tickers` is `>= config.max_tickers`.
    pub fn new(
        tickers: &[TickerId],
        book_config: impl Fn(TickerId) -> OrderBookConfig,
        config: EngineConfig,
    ) -> Self {
        let mut books: Vec<Option<OrderBook>> = (0..config.max_tickers).map(|_| None).collect();
        for &ticker_id in tickers {
            let idx = ticker_id as usize;
            assert!(
                idx < config.max_tickers,
                "engine: ticker_id {ticker_id} exceeds configured max_tickers {}",
                config.max_tickers
            );
            books[idx] = Some(OrderBook::new(book_config(ticker_id)));
        }

        Self {
            books,
            inbound: Arc::new(SpscQueue::new(config.inbound_capacity)),
            responses: Arc::new(SpscQueue::new(config.response_capacity)),
            market_updates: Arc::new(SpscQueue::new(config.market_update_capacity)),
        }
    }

    /// The producer handle the sequencer pushes requests onto.
    pub fn inbound_queue(&self) -> Arc<SpscQueue<MeClientRequest>> {
        Arc::clone(&self.inbound)
    }

    /// The consumer handle the gateway's outbound path drains.
    pub fn responses_queue(&self) -> Arc<SpscQueue<MeClientResponse>> {
        Arc::clone(&self.responses)
    }

    /// The consumer handle the market-data publisher drains.
    pub fn market_updates_queue(&self) -> Arc<SpscQueue<MeMarketUpdate>> {
        Arc::clone(&self.market_updates)
    }

    pub fn book(&self, ticker_id: TickerId) -> Option<&OrderBook> {
        self.books.get(ticker_id as usize).and_then(Option::as_ref)
    }

    /// Dispatches exactly one queued request, if any. Returns whether
    /// there was work to do — callers loop on this for a busy-poll.
    pub fn process_one(&mut self) -> bool {
        let Some(req) = self.inbound.next_read().copied() else {
            return false;
        };
        self.inbound.advance_read();
        self.dispatch(&req);
        true
    }

    fn dispatch(&mut self, req: &MeClientRequest) {
        let idx = req.ticker_id as usize;
        let book = self
            .books
            .get_mut(idx)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("engine: unknown ticker_id {}", req.ticker_id));

        let responses = &self.responses;
        let market_updates = &self.market_updates;

        match req.kind {
            ClientRequestType::New => book.add(
                req,
                |r| Self::publish_response(responses, r),
                |u| Self::publish_update(market_updates, u),
            ),
            ClientRequestType::Cancel => book.cancel(
                req.client_id,
                req.order_id,
                req.ticker_id,
                |r| Self::publish_response(responses, r),
                |u| Self::publish_update(market_updates, u),
            ),
            ClientRequestType::Invalid => {
                panic!("engine: unknown ClientRequestType reached dispatch (ticker {})", req.ticker_id)
            }
        }
    }

    fn publish_response(queue: &SpscQueue<MeClientResponse>, r: &MeClientResponse) {
        *queue.next_write() = *r;
        queue.advance_write();
    }

    fn publish_update(queue: &SpscQueue<MeMarketUpdate>, u: &MeMarketUpdate) {
        *queue.next_write() = *u;
        queue.advance_write();
    }

    /// Spawns the dedicated matcher thread, busy-polling `inbound` until
    /// `run` is cleared and the queue has fully drained. Consumes `self`
    /// — a book is only ever touched by this one thread for its
    /// lifetime, per the concurrency model.
    pub fn run(mut self, run: Arc<AtomicBool>, pin_to_core: bool) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name("matcher".into())
            .spawn(move || {
                if pin_to_core {
                    Self::pin_to_last_core();
                }
                loop {
                    if !self.process_one() {
                        if !run.load(Ordering::Acquire) {
                            break;
                        }
                        std::hint::spin_loop();
                    }
                }
            })
            .expect("engine: failed to spawn matcher thread")
    }

    /// Pins the current thread to the last available CPU core, which is
    /// conventionally the one isolated from OS interrupt handling.
    fn pin_to_last_core() {
        if let Some(core_ids) = core_affinity::get_core_ids() {
            if let Some(last_core) = core_ids.last() {
                core_affinity::set_for_current(*last_core);
            }
        }
    }
}
