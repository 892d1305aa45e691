//! Extended benchmark suite — more comprehensive latency measurements.
//!
//! Includes:
//! - Matching across multiple price levels
//! - Book depth impact on performance
//! - Cancel scaling with book size
//! - Realistic HFT-style mixed workload
//! - Cache-effect comparison (small vs. large resting book)
//! - Batch throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lob_core::{ClientRequestType, MeClientRequest, OrderBook, OrderBookConfig, Side};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const TICKER: u64 = 1;
const ORDER_ID_SPACE: usize = 1 << 20;

fn book(capacity: u32) -> OrderBook {
    OrderBook::new(OrderBookConfig {
        ticker_id: TICKER,
        max_price_levels: 4096,
        max_clients: 8,
        max_order_ids: ORDER_ID_SPACE,
        order_pool_capacity: capacity,
        level_pool_capacity: 4096,
    })
}

fn new_order(client_id: u64, order_id: u64, side: Side, price: i64, qty: u32) -> MeClientRequest {
    MeClientRequest {
        kind: ClientRequestType::New,
        client_id,
        ticker_id: TICKER,
        order_id,
        side,
        price,
        qty,
    }
}

/// Benchmark: match across multiple price levels.
fn bench_multi_level_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_level_match");

    for levels in [1, 5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(levels), levels, |b, &levels| {
            let mut book = book(200_000);

            for i in 0..levels {
                for j in 0..10 {
                    book.add(&new_order(1, (i * 10 + j) as u64, Side::Sell, 10_000 + i as i64 * 10, 10), |_| {}, |_| {});
                }
            }

            let mut order_id = 1000u64;

            b.iter(|| {
                order_id = (order_id + 1) % (ORDER_ID_SPACE as u64 / 2);
                let result = book.add(
                    &new_order(2, order_id, Side::Buy, 10_000 + (levels as i64 - 1) * 10, levels as u32 * 10),
                    |_| {},
                    |_| {},
                );

                // Replenish one order per level, in the other half of the id space.
                for i in 0..levels {
                    let replenish_id = ORDER_ID_SPACE as u64 / 2 + (order_id * 20 + i as u64) % (ORDER_ID_SPACE as u64 / 2);
                    book.add(&new_order(1, replenish_id, Side::Sell, 10_000 + i as i64 * 10, 10), |_| {}, |_| {});
                }

                black_box(result)
            })
        });
    }

    group.finish();
}

/// Benchmark: impact of resting book depth on adding a non-matching order.
///
/// The added order never crosses the book, so without bounding, depth
/// would grow every iteration; instead each iteration reuses a fixed
/// window of slots, canceling a slot's previous occupant before resting
/// a fresh order in it.
fn bench_book_depth_impact(c: &mut Criterion) {
    let mut group = c.benchmark_group("book_depth_add");
    const CHURN_WINDOW: u64 = 2_000;

    for depth in [100, 1_000, 10_000, 50_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            let mut book = book((depth as u32) + CHURN_WINDOW as u32 + 10);

            for i in 0..depth {
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                book.add(&new_order(1, i as u64, side, 9000 + (i % 100) as i64 * 10, 100), |_| {}, |_| {});
            }

            let mut slot = 0u64;

            b.iter(|| {
                let churn_slot = depth as u64 + slot;
                book.cancel(1, churn_slot, TICKER, |_| {}, |_| {});
                slot = (slot + 1) % CHURN_WINDOW;
                black_box(book.add(&new_order(1, churn_slot, Side::Buy, 8000, 100), |_| {}, |_| {})) // won't match
            })
        });
    }

    group.finish();
}

/// Benchmark: cancel performance with varying book sizes.
fn bench_cancel_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel_scaling");

    for book_size in [100, 1_000, 10_000, 50_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(book_size), book_size, |b, &book_size| {
            let mut book = book((book_size as u32) + 1000);

            for i in 0..book_size {
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                book.add(&new_order(1, i as u64, side, 9000 + (i % 200) as i64 * 10, 100), |_| {}, |_| {});
            }

            let mut cancel_id = 0u64;
            let mut next_id = book_size as u64;

            b.iter(|| {
                let result = book.cancel(1, cancel_id, TICKER, |_| {}, |_| {});
                let side = if cancel_id % 2 == 0 { Side::Buy } else { Side::Sell };
                book.add(&new_order(1, next_id, side, 9000 + (cancel_id % 200) as i64 * 10, 100), |_| {}, |_| {});
                cancel_id = next_id;
                next_id = (next_id + 1) % ORDER_ID_SPACE as u64;
                black_box(result)
            })
        });
    }

    group.finish();
}

/// Benchmark: high-frequency realistic workload (tight spread, many cancels).
///
/// Bid and ask slots are each drawn from a fixed window so the resting
/// count stays bounded regardless of the add/cancel mix.
fn bench_realistic_hft(c: &mut Criterion) {
    let mut group = c.benchmark_group("realistic_hft");
    const WINDOW: u64 = 2_000;

    group.bench_function("tight_spread_workload", |b| {
        let mut book = book(2 * WINDOW as u32 + 1000);
        let mut rng = ChaCha8Rng::seed_from_u64(0xCAFE_BABE);

        for i in 0..WINDOW {
            book.add(&new_order(1, i, Side::Buy, 9990 + (i % 10) as i64, 100), |_| {}, |_| {});
            book.add(&new_order(1, WINDOW + i, Side::Sell, 10001 + (i % 10) as i64, 100), |_| {}, |_| {});
        }

        b.iter(|| {
            let op = rng.gen_range(0..100);
            let result = if op < 40 {
                let slot = rng.gen_range(0..WINDOW);
                book.cancel(1, slot, TICKER, |_| {}, |_| {});
                book.add(&new_order(1, slot, Side::Buy, 9990 + rng.gen_range(0..10), rng.gen_range(10..200)), |_| {}, |_| {})
            } else if op < 80 {
                let slot = WINDOW + rng.gen_range(0..WINDOW);
                book.cancel(1, slot, TICKER, |_| {}, |_| {});
                book.add(&new_order(1, slot, Side::Sell, 10001 + rng.gen_range(0..10), rng.gen_range(10..200)), |_| {}, |_| {})
            } else {
                let slot = rng.gen_range(0..2 * WINDOW);
                book.cancel(1, slot, TICKER, |_| {}, |_| {})
            };
            black_box(result)
        })
    });

    group.finish();
}

/// Benchmark: warm vs. cold cache performance (small vs. large resting book).
fn bench_cache_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_effects");

    group.bench_function("small_book_100", |b| {
        let mut book = book(2000);
        for i in 0..100 {
            book.add(&new_order(1, i, Side::Sell, 10_000, 100), |_| {}, |_| {});
        }

        let mut order_id = 1000u64;

        b.iter(|| {
            order_id = (order_id + 1) % (ORDER_ID_SPACE as u64 / 2);
            let result = book.add(&new_order(2, order_id, Side::Buy, 10_000, 100), |_| {}, |_| {});
            book.add(&new_order(1, ORDER_ID_SPACE as u64 / 2 + order_id, Side::Sell, 10_000, 100), |_| {}, |_| {});
            black_box(result)
        })
    });

    group.bench_function("large_book_50k", |b| {
        let mut book = book(200_000);
        for i in 0..50_000 {
            let side = if i % 2 == 0 { Side::Sell } else { Side::Buy };
            book.add(&new_order(1, i, side, 9000 + (i % 1000) as i64, 100), |_| {}, |_| {});
        }

        let mut order_id = 100_000u64;

        b.iter(|| {
            order_id += 1;
            black_box(book.add(&new_order(2, order_id, Side::Buy, 9500, 100), |_| {}, |_| {}))
        })
    });

    group.finish();
}

/// Benchmark: throughput with batch processing.
fn bench_batch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_throughput");

    for batch_size in [100u64, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*batch_size));

        group.bench_with_input(BenchmarkId::from_parameter(batch_size), batch_size, |b, &batch_size| {
            let mut book = book((batch_size as u32) + 10);
            let mut rng = ChaCha8Rng::seed_from_u64(0x1234_5678);

            b.iter(|| {
                for i in 0..batch_size {
                    book.cancel(1, i, TICKER, |_| {}, |_| {});
                    let req = new_order(
                        1,
                        i,
                        if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
                        9900 + rng.gen_range(0..200),
                        rng.gen_range(1..500),
                    );
                    black_box(book.add(&req, |_| {}, |_| {}));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    extended_benches,
    bench_multi_level_match,
    bench_book_depth_impact,
    bench_cancel_scaling,
    bench_realistic_hft,
    bench_cache_effects,
    bench_batch_throughput,
);

criterion_main!(extended_benches);
