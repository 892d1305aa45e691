//! FIFO sequencer: restores cross-socket arrival order within a single
//! gateway read cycle before requests reach the matcher.
//!
//! A single gateway thread servicing many sockets with edge-triggered
//! readiness would otherwise impose socket-iteration order on the
//! matcher. Recording each request's kernel receive timestamp and
//! stable-sorting by it before publishing gives a fair cross-socket
//! ordering instead.

use arrayvec::ArrayVec;
use std::sync::Arc;

use crate::limits::SEQUENCER_BATCH_CAPACITY;
use crate::spsc::SpscQueue;
use crate::types::MeClientRequest;

pub struct FifoSequencer {
    pending: ArrayVec<(u64, MeClientRequest), SEQUENCER_BATCH_CAPACITY>,
    inbound: Arc<SpscQueue<MeClientRequest>>,
}

impl FifoSequencer {
    pub fn new(inbound: Arc<SpscQueue<MeClientRequest>>) -> Self {
        Self {
            pending: ArrayVec::new(),
            inbound,
        }
    }

    /// Buffers `request`, recorded at kernel receive time `rx_time_ns`.
    ///
    /// # Panics
    /// Fatal if the current read cycle has already buffered
    /// [`SEQUENCER_BATCH_CAPACITY`] requests without an intervening
    /// [`Self::sequence_and_publish`] — that read cycle serviced far
    /// more sockets than this sequencer was sized for.
    pub fn add(&mut self, rx_time_ns: u64, request: MeClientRequest) {
        self.pending.try_push((rx_time_ns, request)).unwrap_or_else(|_| {
            panic!(
                "sequencer: read-cycle batch exceeded capacity {SEQUENCER_BATCH_CAPACITY}"
            )
        });
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Stable-sorts the buffered batch by `rx_time_ns` ascending (ties
    /// keep insertion order) and publishes each request onto the
    /// matcher's inbound queue in that order, then clears the buffer.
    pub fn sequence_and_publish(&mut self) {
        self.pending.sort_by_key(|(rx_time, _)| *rx_time);
        for (_, request) in self.pending.drain(..) {
            *self.inbound.next_write() = request;
            self.inbound.advance_write();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientRequestType, Side};

    fn request(order_id: u64) -> MeClientRequest {
        MeClientRequest {
            kind: ClientRequestType::New,
            client_id: 1,
            ticker_id: 1,
            order_id,
            side: Side::Buy,
            price: 100,
            qty: 1,
        }
    }

    #[test]
    fn sorts_by_receive_timestamp_regardless_of_arrival_order() {
        let inbound = Arc::new(SpscQueue::<MeClientRequest>::new(8));
        let mut sequencer = FifoSequencer::new(Arc::clone(&inbound));

        sequencer.add(30, request(3));
        sequencer.add(10, request(1));
        sequencer.add(20, request(2));
        sequencer.sequence_and_publish();

        assert_eq!(sequencer.pending_len(), 0);
        let order_ids: Vec<u64> = (0..3)
            .map(|_| {
                let v = inbound.next_read().copied().unwrap();
                inbound.advance_read();
                v.order_id
            })
            .collect();
        assert_eq!(order_ids, vec![1, 2, 3]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let inbound = Arc::new(SpscQueue::<MeClientRequest>::new(8));
        let mut sequencer = FifoSequencer::new(Arc::clone(&inbound));

        sequencer.add(10, request(1));
        sequencer.add(10, request(2));
        sequencer.add(10, request(3));
        sequencer.sequence_and_publish();

        let order_ids: Vec<u64> = (0..3)
            .map(|_| {
                let v = inbound.next_read().copied().unwrap();
                inbound.advance_read();
                v.order_id
            })
            .collect();
        assert_eq!(order_ids, vec![1, 2, 3]);
    }

    #[test]
    fn already_sorted_batch_preserves_order() {
        let inbound = Arc::new(SpscQueue::<MeClientRequest>::new(8));
        let mut sequencer = FifoSequencer::new(Arc::clone(&inbound));

        for (t, id) in [(1, 1), (2, 2), (3, 3), (4, 4)] {
            sequencer.add(t, request(id));
        }
        sequencer.sequence_and_publish();

        let order_ids: Vec<u64> = (0..4)
            .map(|_| {
                let v = inbound.next_read().copied().unwrap();
                inbound.advance_read();
                v.order_id
            })
            .collect();
        assert_eq!(order_ids, vec![1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "exceeded capacity")]
    fn overflowing_batch_capacity_is_fatal() {
        let inbound = Arc::new(SpscQueue::<MeClientRequest>::new(SEQUENCER_BATCH_CAPACITY + 8));
        let mut sequencer = FifoSequencer::new(inbound);
        for i in 0..=SEQUENCER_BATCH_CAPACITY as u64 {
            sequencer.add(i, request(i));
        }
    }
}
