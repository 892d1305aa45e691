//! Fixed capacities that size every preallocated structure in the core:
//! the direct-indexed price table, the two-level client/order lookup
//! table, and the Order/PriceLevel pools. All of these are pool or
//! array *capacities*, never resized at runtime.

/// Default number of instruments the matching engine can host
/// simultaneously (size of the engine's book array).
pub const ME_MAX_TICKERS: usize = 8;

/// Default width of the direct-indexed price table: `price mod
/// ME_MAX_PRICE_LEVELS` must land in a dense window with no collisions
/// for any one instrument.
pub const ME_MAX_PRICE_LEVELS: usize = 16_384;

/// Default outer dimension of the two-level `(client_id,
/// client_order_id) -> Order` lookup table.
pub const ME_MAX_NUM_CLIENTS: usize = 256;

/// Default inner dimension of the two-level lookup table: the largest
/// `client_order_id` any one client may use.
pub const ME_MAX_ORDER_IDS: usize = 65_536;

/// Default Order pool capacity. Must strictly exceed the peak number of
/// simultaneously resting orders in one book.
pub const ME_DEFAULT_ORDER_POOL_CAPACITY: u32 = 1 << 20;

/// Default PriceLevel pool capacity. Must strictly exceed the peak
/// number of simultaneously non-empty price levels in one book.
pub const ME_DEFAULT_LEVEL_POOL_CAPACITY: u32 = ME_MAX_PRICE_LEVELS as u32;

/// Maximum number of requests the FIFO sequencer buffers during a
/// single gateway read cycle, across however many sockets it serviced.
pub const SEQUENCER_BATCH_CAPACITY: usize = 4096;
