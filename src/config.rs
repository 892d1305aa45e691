//! Gateway/engine startup configuration.
//!
//! Everything here is a startup constant, sized once at process start —
//! per the concurrency model, no pool or queue is ever resized while
//! running. There is no persisted state: every run starts from an
//! empty book.

use clap::Parser;

use crate::book::OrderBookConfig;
use crate::engine::EngineConfig;
use crate::limits::{
    ME_DEFAULT_LEVEL_POOL_CAPACITY, ME_DEFAULT_ORDER_POOL_CAPACITY, ME_MAX_NUM_CLIENTS,
    ME_MAX_ORDER_IDS, ME_MAX_PRICE_LEVELS, ME_MAX_TICKERS,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "gateway-server", about = "Order gateway and matching engine")]
pub struct GatewayConfig {
    /// Interface/address to bind the client-facing TCP listener to.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// TCP port to listen on.
    #[arg(long, default_value_t = 9_999)]
    pub port: u16,

    /// Ticker ids to create books for at startup.
    #[arg(long, default_value = "1", value_delimiter = ',')]
    pub tickers: Vec<u64>,

    /// Width of the direct-indexed price table (the `ME_MAX_PRICE_LEVELS`
    /// modulus). Must exceed the number of distinct resting prices any
    /// one instrument can have at once.
    #[arg(long, default_value_t = ME_MAX_PRICE_LEVELS)]
    pub max_price_levels: usize,

    /// Number of instruments the engine can host simultaneously.
    #[arg(long, default_value_t = ME_MAX_TICKERS)]
    pub max_tickers: usize,

    /// Outer dimension of the two-level client/order lookup table.
    #[arg(long, default_value_t = ME_MAX_NUM_CLIENTS)]
    pub max_clients: usize,

    /// Inner dimension of the two-level client/order lookup table.
    #[arg(long, default_value_t = ME_MAX_ORDER_IDS)]
    pub max_order_ids: usize,

    /// Order pool capacity, per book. Must strictly exceed the peak
    /// number of simultaneously resting orders in one book.
    #[arg(long, default_value_t = ME_DEFAULT_ORDER_POOL_CAPACITY)]
    pub order_pool_capacity: u32,

    /// PriceLevel pool capacity, per book. Must strictly exceed the peak
    /// number of simultaneously non-empty price levels in one book.
    #[arg(long, default_value_t = ME_DEFAULT_LEVEL_POOL_CAPACITY)]
    pub level_pool_capacity: u32,

    /// Capacity of the matcher's inbound request queue.
    #[arg(long, default_value_t = 65_536)]
    pub inbound_queue_capacity: usize,

    /// Capacity of the matcher's outbound client-response queue.
    #[arg(long, default_value_t = 65_536)]
    pub response_queue_capacity: usize,

    /// Capacity of the matcher's outbound market-update queue.
    #[arg(long, default_value_t = 65_536)]
    pub market_update_queue_capacity: usize,

    /// Pin the matcher thread to the last available CPU core.
    #[arg(long, default_value_t = true)]
    pub pin_matcher_to_core: bool,

    /// File path the hot-path Logger writes to.
    #[arg(long, default_value = "lob-core.log")]
    pub log_file_path: String,

    /// Ring capacity (in log elements) of the hot-path Logger's queue.
    #[arg(long, default_value_t = 1 << 16)]
    pub log_queue_capacity: usize,
}

impl GatewayConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_tickers: self.max_tickers,
            inbound_capacity: self.inbound_queue_capacity,
            response_capacity: self.response_queue_capacity,
            market_update_capacity: self.market_update_queue_capacity,
        }
    }

    pub fn book_config(&self, ticker_id: crate::types::TickerId) -> OrderBookConfig {
        OrderBookConfig {
            ticker_id,
            max_price_levels: self.max_price_levels,
            max_clients: self.max_clients,
            max_order_ids: self.max_order_ids,
            order_pool_capacity: self.order_pool_capacity,
            level_pool_capacity: self.level_pool_capacity,
        }
    }
}
