//! Packed, no-padding wire layouts for the three external record types,
//! and the typed errors produced when a byte slice doesn't decode.
//!
//! Socket I/O itself — listening, accepting, buffering partial reads
//! across TCP segmentation — is a boundary this crate does not own; this
//! module only owns turning one fully-assembled, contiguous record's
//! worth of bytes into (or out of) the in-memory [`crate::types`]
//! structs. `#[repr(C, packed)]` plus `zerocopy`'s `Unaligned` derive
//! lets that happen with no padding and no copy beyond the one the
//! caller already made into a contiguous buffer.

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::types::{
    ClientRequestType, ClientResponseType, MarketUpdateType, MeClientRequest, MeClientResponse,
    MeMarketUpdate, Side,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("{kind}: need exactly {needed} bytes, got {got}")]
    Truncated {
        kind: &'static str,
        needed: usize,
        got: usize,
    },
}

/// Inbound `OMClientRequest`: a sequence number followed by a
/// `MEClientRequest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C, packed)]
pub struct WireClientRequest {
    pub seq_num: u64,
    pub kind: u8,
    pub client_id: u64,
    pub ticker_id: u64,
    pub order_id: u64,
    pub side: i8,
    pub price: i64,
    pub qty: u32,
}

impl WireClientRequest {
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        Self::read_from_bytes(bytes).map_err(|_| WireError::Truncated {
            kind: "OMClientRequest",
            needed: std::mem::size_of::<Self>(),
            got: bytes.len(),
        })
    }

    pub fn encode(&self) -> &[u8] {
        self.as_bytes()
    }

    pub fn to_client_request(self) -> MeClientRequest {
        MeClientRequest {
            kind: ClientRequestType::from(self.kind),
            client_id: self.client_id,
            ticker_id: self.ticker_id,
            order_id: self.order_id,
            side: Side::from(self.side),
            price: self.price,
            qty: self.qty,
        }
    }

    pub fn from_client_request(seq_num: u64, req: &MeClientRequest) -> Self {
        Self {
            seq_num,
            kind: req.kind as u8,
            client_id: req.client_id,
            ticker_id: req.ticker_id,
            order_id: req.order_id,
            side: i8::from(req.side),
            price: req.price,
            qty: req.qty,
        }
    }
}

/// Outbound `OMClientResponse`: a per-client sequence number followed
/// by a `MEClientResponse`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C, packed)]
pub struct WireClientResponse {
    pub seq_num: u64,
    pub kind: u8,
    pub client_id: u64,
    pub ticker_id: u64,
    pub client_order_id: u64,
    pub market_order_id: u64,
    pub side: i8,
    pub price: i64,
    pub exec_qty: u32,
    pub leaves_qty: u32,
}

impl WireClientResponse {
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        Self::read_from_bytes(bytes).map_err(|_| WireError::Truncated {
            kind: "OMClientResponse",
            needed: std::mem::size_of::<Self>(),
            got: bytes.len(),
        })
    }

    pub fn encode(&self) -> &[u8] {
        self.as_bytes()
    }

    pub fn from_response(seq_num: u64, r: &MeClientResponse) -> Self {
        Self {
            seq_num,
            kind: r.kind as u8,
            client_id: r.client_id,
            ticker_id: r.ticker_id,
            client_order_id: r.client_order_id,
            market_order_id: r.market_order_id,
            side: i8::from(r.side),
            price: r.price,
            exec_qty: r.exec_qty,
            leaves_qty: r.leaves_qty,
        }
    }

    pub fn to_response(self) -> MeClientResponse {
        MeClientResponse {
            kind: ClientResponseType::from(self.kind),
            client_id: self.client_id,
            ticker_id: self.ticker_id,
            client_order_id: self.client_order_id,
            market_order_id: self.market_order_id,
            side: Side::from(self.side),
            price: self.price,
            exec_qty: self.exec_qty,
            leaves_qty: self.leaves_qty,
        }
    }
}

/// `MDPMarketUpdate`: a sequence number followed by a `MEMarketUpdate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C, packed)]
pub struct WireMarketUpdate {
    pub seq_num: u64,
    pub kind: u8,
    pub order_id: u64,
    pub ticker_id: u64,
    pub side: i8,
    pub price: i64,
    pub qty: u32,
    pub priority: u64,
}

impl WireMarketUpdate {
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        Self::read_from_bytes(bytes).map_err(|_| WireError::Truncated {
            kind: "MDPMarketUpdate",
            needed: std::mem::size_of::<Self>(),
            got: bytes.len(),
        })
    }

    pub fn encode(&self) -> &[u8] {
        self.as_bytes()
    }

    pub fn from_update(seq_num: u64, u: &MeMarketUpdate) -> Self {
        Self {
            seq_num,
            kind: u.kind as u8,
            order_id: u.order_id,
            ticker_id: u.ticker_id,
            side: i8::from(u.side),
            price: u.price,
            qty: u.qty,
            priority: u.priority,
        }
    }

    pub fn to_update(self) -> MeMarketUpdate {
        MeMarketUpdate {
            kind: MarketUpdateType::from(self.kind),
            order_id: self.order_id,
            ticker_id: self.ticker_id,
            side: Side::from(self.side),
            price: self.price,
            qty: self.qty,
            priority: self.priority,
        }
    }
}
