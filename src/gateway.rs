//! Gateway glue: turns framed wire bytes from many sockets into
//! sequenced requests for the matcher, and turns the matcher's private
//! responses back into per-client framed bytes.
//!
//! The socket layer itself — accepting connections, reading/writing
//! bytes, `EWOULDBLOCK` retry — is out of scope (§1); this module only
//! owns what happens between "a socket produced N complete bytes" and
//! "the matcher's inbound queue has a sequenced request", and the
//! mirror image on the outbound side. Per the design note on "shared
//! callback identity", the socket layer's per-socket receive callback
//! and per-read-cycle completion callback are modeled as the
//! [`FrameSource`]/[`CycleBoundary`] traits rather than stored function
//! pointers, keeping the wiring statically typed.

use rustc_hash::FxHashMap;

use crate::sequencer::FifoSequencer;
use crate::spsc::SpscQueue;
use crate::types::{ClientId, MeClientResponse};
use crate::wire::{WireClientRequest, WireClientResponse};

/// Opaque handle for one socket. Assigned and owned by the (out of
/// scope) socket layer; the gateway only ever compares these for
/// equality.
pub type SocketId = u64;

struct ClientSession {
    socket_id: SocketId,
    next_expected_seq: u64,
    next_outgoing_seq: u64,
}

/// Invoked once per fully-framed inbound record the socket layer reads
/// off a socket, carrying that socket's id and the record's kernel
/// receive timestamp.
pub trait FrameSource {
    fn on_frame(&mut self, socket_id: SocketId, rx_time_ns: u64, frame: &[u8]);
}

/// Invoked once every socket has been drained for the current gateway
/// read cycle.
pub trait CycleBoundary {
    fn on_cycle_end(&mut self);
}

pub struct Gateway {
    sessions: FxHashMap<ClientId, ClientSession>,
    sequencer: FifoSequencer,
}

impl Gateway {
    pub fn new(inbound: std::sync::Arc<SpscQueue<crate::types::MeClientRequest>>) -> Self {
        Self {
            sessions: FxHashMap::default(),
            sequencer: FifoSequencer::new(inbound),
        }
    }

    fn handle_frame(&mut self, socket_id: SocketId, rx_time_ns: u64, frame: &[u8]) {
        let wire = match WireClientRequest::decode(frame) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "gateway: dropping malformed frame");
                return;
            }
        };

        let request = wire.to_client_request();
        let client_id = request.client_id;
        let seq_num = wire.seq_num;

        let session = self.sessions.entry(client_id).or_insert_with(|| ClientSession {
            socket_id,
            next_expected_seq: 1,
            next_outgoing_seq: 1,
        });

        if session.socket_id != socket_id {
            tracing::warn!(
                client_id,
                bound_socket = session.socket_id,
                frame_socket = socket_id,
                "gateway: dropping frame from client_id bound to a different socket"
            );
            return;
        }

        if seq_num != session.next_expected_seq {
            tracing::warn!(
                client_id,
                expected = session.next_expected_seq,
                got = seq_num,
                "gateway: dropping out-of-sequence frame"
            );
            return;
        }

        session.next_expected_seq += 1;
        self.sequencer.add(rx_time_ns, request);
    }

    /// Pops one response off `responses`, prefixes it with that
    /// client's next outgoing sequence number, and returns the
    /// destination socket and the framed bytes to write to it.
    ///
    /// # Panics
    /// Fatal if the response names a `client_id` the gateway never
    /// bound to a socket — every response the matcher emits must
    /// correspond to a request this gateway forwarded.
    pub fn next_outbound_frame(
        &mut self,
        responses: &SpscQueue<MeClientResponse>,
    ) -> Option<(SocketId, Vec<u8>)> {
        let response = responses.next_read().copied()?;
        responses.advance_read();

        let session = self.sessions.get_mut(&response.client_id).unwrap_or_else(|| {
            panic!(
                "gateway: response for client_id {} that was never bound to a socket",
                response.client_id
            )
        });

        let seq_num = session.next_outgoing_seq;
        session.next_outgoing_seq += 1;

        let wire = WireClientResponse::from_response(seq_num, &response);
        Some((session.socket_id, wire.encode().to_vec()))
    }
}

impl FrameSource for Gateway {
    fn on_frame(&mut self, socket_id: SocketId, rx_time_ns: u64, frame: &[u8]) {
        self.handle_frame(socket_id, rx_time_ns, frame);
    }
}

impl CycleBoundary for Gateway {
    fn on_cycle_end(&mut self) {
        self.sequencer.sequence_and_publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientRequestType, MeClientRequest, Side};
    use std::sync::Arc;

    fn frame(seq_num: u64, client_id: ClientId, order_id: u64) -> Vec<u8> {
        let req = MeClientRequest {
            kind: ClientRequestType::New,
            client_id,
            ticker_id: 1,
            order_id,
            side: Side::Buy,
            price: 100,
            qty: 1,
        };
        WireClientRequest::from_client_request(seq_num, &req).encode().to_vec()
    }

    #[test]
    fn first_frame_binds_client_to_socket() {
        let inbound = Arc::new(SpscQueue::new(8));
        let mut gateway = Gateway::new(Arc::clone(&inbound));

        gateway.on_frame(1, 100, &frame(1, 5, 1));
        gateway.on_cycle_end();

        assert_eq!(inbound.size(), 1);
    }

    #[test]
    fn frame_from_a_different_socket_for_a_bound_client_is_dropped() {
        let inbound = Arc::new(SpscQueue::new(8));
        let mut gateway = Gateway::new(Arc::clone(&inbound));

        gateway.on_frame(1, 100, &frame(1, 5, 1));
        gateway.on_frame(2, 200, &frame(2, 5, 2)); // same client_id, different socket
        gateway.on_cycle_end();

        assert_eq!(inbound.size(), 1);
    }

    #[test]
    fn sequence_gap_is_dropped() {
        let inbound = Arc::new(SpscQueue::new(8));
        let mut gateway = Gateway::new(Arc::clone(&inbound));

        gateway.on_frame(1, 100, &frame(1, 5, 1));
        gateway.on_frame(1, 200, &frame(3, 5, 2)); // expected seq 2, got 3
        gateway.on_cycle_end();

        assert_eq!(inbound.size(), 1);
    }

    #[test]
    fn in_sequence_frames_all_publish() {
        let inbound = Arc::new(SpscQueue::new(8));
        let mut gateway = Gateway::new(Arc::clone(&inbound));

        gateway.on_frame(1, 300, &frame(1, 5, 1));
        gateway.on_frame(1, 100, &frame(2, 5, 2));
        gateway.on_frame(1, 200, &frame(3, 5, 3));
        gateway.on_cycle_end();

        assert_eq!(inbound.size(), 3);
        // Sequenced by rx_time, not wire seq_num.
        let first = inbound.next_read().copied().unwrap();
        assert_eq!(first.order_id, 2);
    }

    #[test]
    fn outbound_frames_get_increasing_per_client_sequence_numbers() {
        let inbound = Arc::new(SpscQueue::new(8));
        let mut gateway = Gateway::new(Arc::clone(&inbound));
        gateway.on_frame(1, 100, &frame(1, 5, 1));

        let responses = SpscQueue::<MeClientResponse>::new(4);
        for exec_qty in [0u32, 1u32] {
            *responses.next_write() = MeClientResponse {
                client_id: 5,
                exec_qty,
                ..MeClientResponse::default()
            };
            responses.advance_write();
        }

        let (_, bytes1) = gateway.next_outbound_frame(&responses).unwrap();
        let (_, bytes2) = gateway.next_outbound_frame(&responses).unwrap();
        let seq1 = WireClientResponse::decode(&bytes1).unwrap().seq_num;
        let seq2 = WireClientResponse::decode(&bytes2).unwrap().seq_num;
        assert_eq!(seq1, 1);
        assert_eq!(seq2, 2);
    }

    #[test]
    #[should_panic(expected = "never bound to a socket")]
    fn outbound_response_for_unbound_client_is_fatal() {
        let inbound = Arc::new(SpscQueue::new(8));
        let mut gateway = Gateway::new(inbound);

        let responses = SpscQueue::<MeClientResponse>::new(4);
        *responses.next_write() = MeClientResponse {
            client_id: 999,
            ..MeClientResponse::default()
        };
        responses.advance_write();

        gateway.next_outbound_frame(&responses);
    }
}
