//! # lob-core
//!
//! The core of a financial exchange: a single-instrument-sharded
//! limit-order matching engine and the low-latency infrastructure it
//! runs on.
//!
//! ## Design principles
//!
//! - **Single-writer**: one thread (T2) owns each book exclusively, no
//!   locks.
//! - **O(1) hot path**: pool allocation, SPSC queue push/pop, and price
//!   level lookup are all O(1) amortized.
//! - **No heap allocation on the hot path**: every hot-path object lives
//!   in a [`pool::Pool`], sized at startup.
//! - **Busy-polling, not async**: native threads, no cooperative
//!   scheduler.
//!
//! ## Data flow
//!
//! ```text
//! socket bytes -> Gateway (frames + rx timestamp)
//!              -> Sequencer (sorts one read cycle by rx timestamp)
//!              -> Engine inbound queue (SPSC)
//!              -> Engine (dispatches by ticker_id)
//!              -> OrderBook::add / OrderBook::cancel
//!              -> responses queue + market_updates queue (SPSC)
//!              -> Gateway outbound / market-data publisher
//! ```
//!
//! Dependency order of the modules below mirrors how each one builds on
//! the last: [`pool`] -> [`spsc`] -> [`logger`] -> [`sequencer`] ->
//! [`order`]/[`price_level`]/[`book`] -> [`engine`] -> [`gateway`].

pub mod book;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod limits;
pub mod logger;
pub mod order;
pub mod pool;
pub mod price_level;
pub mod sequencer;
pub mod spsc;
pub mod types;
pub mod wire;

pub use book::{OrderBook, OrderBookConfig};
pub use config::GatewayConfig;
pub use engine::{Engine, EngineConfig};
pub use gateway::{CycleBoundary, FrameSource, Gateway, SocketId};
pub use logger::{AsyncLogger, LogValue};
pub use pool::{Pool, PoolIndex, NULL_INDEX};
pub use sequencer::FifoSequencer;
pub use spsc::SpscQueue;
pub use types::{
    ClientId, ClientRequestType, ClientResponseType, MarketUpdateType, MeClientRequest,
    MeClientResponse, MeMarketUpdate, OrderId, Price, Priority, Qty, Side, TickerId,
};
pub use wire::{WireClientRequest, WireClientResponse, WireError, WireMarketUpdate};
