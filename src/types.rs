//! Core identifiers and wire-stable enums shared by every component.
//!
//! All identifiers are dense unsigned integers with a reserved sentinel
//! value standing in for "no value" / "invalid". `Price` is the one
//! signed quantity; its sentinel is its maximum positive value rather
//! than its bit pattern's maximum.

use std::fmt;

pub type OrderId = u64;
pub type TickerId = u64;
pub type ClientId = u64;
pub type Priority = u64;
pub type Price = i64;
pub type Qty = u32;

pub const INVALID_ORDER_ID: OrderId = u64::MAX;
pub const INVALID_TICKER_ID: TickerId = u64::MAX;
pub const INVALID_CLIENT_ID: ClientId = u64::MAX;
pub const INVALID_PRIORITY: Priority = u64::MAX;
pub const INVALID_PRICE: Price = i64::MAX;
pub const INVALID_QTY: Qty = u32::MAX;

/// Renders an identifier, substituting the literal `"INVALID"` for its
/// sentinel value, matching the wire protocol's printed-form convention.
pub fn fmt_id(id: u64) -> String {
    if id == INVALID_ORDER_ID {
        "INVALID".to_string()
    } else {
        id.to_string()
    }
}

/// Same as [`fmt_id`] but for the signed `Price` domain.
pub fn fmt_price(price: Price) -> String {
    if price == INVALID_PRICE {
        "INVALID".to_string()
    } else {
        price.to_string()
    }
}

/// Order side. `Buy` and `Sell` sign-extend into the wire's `int8` field;
/// `Invalid` is never a legal input to the book — reaching the matching
/// algorithm with this side is a fatal precondition violation, not a
/// rejectable business error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Side {
    Invalid = 0,
    Buy = 1,
    Sell = -1,
}

impl Default for Side {
    #[inline]
    fn default() -> Self {
        Side::Invalid
    }
}

impl Side {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::Invalid => Side::Invalid,
        }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        matches!(self, Side::Buy | Side::Sell)
    }
}

impl From<i8> for Side {
    fn from(v: i8) -> Self {
        match v {
            1 => Side::Buy,
            -1 => Side::Sell,
            _ => Side::Invalid,
        }
    }
}

impl From<Side> for i8 {
    fn from(s: Side) -> i8 {
        s as i8
    }
}

/// Inbound request kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientRequestType {
    Invalid = 0,
    New = 1,
    Cancel = 2,
}

impl Default for ClientRequestType {
    #[inline]
    fn default() -> Self {
        ClientRequestType::Invalid
    }
}

impl From<u8> for ClientRequestType {
    fn from(v: u8) -> Self {
        match v {
            1 => ClientRequestType::New,
            2 => ClientRequestType::Cancel,
            _ => ClientRequestType::Invalid,
        }
    }
}

/// Private client response kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientResponseType {
    Invalid = 0,
    Accepted = 1,
    Canceled = 2,
    Filled = 3,
    CancelRejected = 4,
}

impl From<u8> for ClientResponseType {
    fn from(v: u8) -> Self {
        match v {
            1 => ClientResponseType::Accepted,
            2 => ClientResponseType::Canceled,
            3 => ClientResponseType::Filled,
            4 => ClientResponseType::CancelRejected,
            _ => ClientResponseType::Invalid,
        }
    }
}

/// Public market-update kind. `SnapshotStart`/`SnapshotEnd` are part of the
/// wire-stable set so downstream consumers can decode them, but this
/// implementation never emits them — no snapshot producer is in this
/// core's scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MarketUpdateType {
    Invalid = 0,
    Clear = 1,
    Add = 2,
    Modify = 3,
    Cancel = 4,
    Trade = 5,
    SnapshotStart = 6,
    SnapshotEnd = 7,
}

impl From<u8> for MarketUpdateType {
    fn from(v: u8) -> Self {
        match v {
            1 => MarketUpdateType::Clear,
            2 => MarketUpdateType::Add,
            3 => MarketUpdateType::Modify,
            4 => MarketUpdateType::Cancel,
            5 => MarketUpdateType::Trade,
            6 => MarketUpdateType::SnapshotStart,
            7 => MarketUpdateType::SnapshotEnd,
            _ => MarketUpdateType::Invalid,
        }
    }
}

/// In-memory (unpacked) client request, as handed from the gateway/
/// sequencer to the matching engine. The wire-framed, `seq_num`-prefixed
/// byte layout lives in [`crate::wire`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MeClientRequest {
    pub kind: ClientRequestType,
    pub client_id: ClientId,
    pub ticker_id: TickerId,
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
}

/// In-memory client response, as produced by a book and consumed by the
/// gateway's outbound path.
#[derive(Clone, Copy)]
pub struct MeClientResponse {
    pub kind: ClientResponseType,
    pub client_id: ClientId,
    pub ticker_id: TickerId,
    pub client_order_id: OrderId,
    pub market_order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub exec_qty: Qty,
    pub leaves_qty: Qty,
}

impl Default for MeClientResponse {
    fn default() -> Self {
        Self {
            kind: ClientResponseType::Invalid,
            client_id: INVALID_CLIENT_ID,
            ticker_id: INVALID_TICKER_ID,
            client_order_id: INVALID_ORDER_ID,
            market_order_id: INVALID_ORDER_ID,
            side: Side::Invalid,
            price: INVALID_PRICE,
            exec_qty: INVALID_QTY,
            leaves_qty: INVALID_QTY,
        }
    }
}

impl fmt::Debug for MeClientResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeClientResponse")
            .field("kind", &self.kind)
            .field("client_id", &fmt_id(self.client_id))
            .field("ticker_id", &fmt_id(self.ticker_id))
            .field("client_order_id", &fmt_id(self.client_order_id))
            .field("market_order_id", &fmt_id(self.market_order_id))
            .field("side", &self.side)
            .field("price", &fmt_price(self.price))
            .field("exec_qty", &self.exec_qty)
            .field("leaves_qty", &self.leaves_qty)
            .finish()
    }
}

/// In-memory public market update, as produced by a book and consumed by
/// the market-data publisher.
#[derive(Clone, Copy)]
pub struct MeMarketUpdate {
    pub kind: MarketUpdateType,
    pub order_id: OrderId,
    pub ticker_id: TickerId,
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
    pub priority: Priority,
}

impl Default for MeMarketUpdate {
    fn default() -> Self {
        Self {
            kind: MarketUpdateType::Invalid,
            order_id: INVALID_ORDER_ID,
            ticker_id: INVALID_TICKER_ID,
            side: Side::Invalid,
            price: INVALID_PRICE,
            qty: INVALID_QTY,
            priority: INVALID_PRIORITY,
        }
    }
}

impl fmt::Debug for MeMarketUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeMarketUpdate")
            .field("kind", &self.kind)
            .field("order_id", &fmt_id(self.order_id))
            .field("ticker_id", &fmt_id(self.ticker_id))
            .field("side", &self.side)
            .field("price", &fmt_price(self.price))
            .field("qty", &self.qty)
            .field("priority", &fmt_id(self.priority))
            .finish()
    }
}
