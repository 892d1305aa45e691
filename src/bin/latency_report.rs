use hdrhistogram::Histogram;
use lob_core::{Engine, EngineConfig, MeClientRequest, OrderBookConfig, Side};
use std::time::Instant;

const TICKER: u64 = 1;

fn book_config(ticker_id: u64) -> OrderBookConfig {
    OrderBookConfig {
        ticker_id,
        max_price_levels: 4096,
        max_clients: 256,
        max_order_ids: 1 << 20,
        order_pool_capacity: 1 << 20,
        level_pool_capacity: 4096,
    }
}

fn main() {
    println!("Preparing latency benchmark...");

    let mut engine = Engine::new(
        &[TICKER],
        book_config,
        EngineConfig {
            max_tickers: 2,
            inbound_capacity: 1 << 20,
            response_capacity: 1 << 20,
            market_update_capacity: 1 << 20,
        },
    );
    let inbound = engine.inbound_queue();

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    const ITERATIONS: u64 = 1_000_000;

    println!("Running {ITERATIONS} iterations...");

    let mut total_duration = std::time::Duration::new(0, 0);
    for order_id in 1..=ITERATIONS {
        let side = if order_id % 2 == 0 { Side::Buy } else { Side::Sell };
        let request = MeClientRequest {
            kind: lob_core::ClientRequestType::New,
            client_id: 1,
            ticker_id: TICKER,
            order_id,
            side,
            price: 10_000 + (order_id % 100) as i64,
            qty: 10,
        };
        *inbound.next_write() = request;
        inbound.advance_write();

        let start = Instant::now();
        std::hint::black_box(engine.process_one());
        let elapsed = start.elapsed();

        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total_duration += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {ITERATIONS}");
    println!(
        "Throughput: {:.2} ops/sec",
        ITERATIONS as f64 / total_duration.as_secs_f64()
    );
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100_000, 2.0) {
        let count = v.count_at_value();
        if count > 0 {
            println!(
                "{:6} ns - {:6} ns: {:10} count",
                v.value_iterated_to(),
                v.value_iterated_to(),
                count
            );
        }
    }
}
