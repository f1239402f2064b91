//! Sugar lexer/parser throughput, same hand-rolled harness style as
//! `eval_throughput.rs`.

use computo::sugar::parse_sugar;
use std::time::{Duration, Instant};

fn mb_per_sec(bytes: u64, dur: Duration) -> f64 {
    bytes as f64 / (1024.0 * 1024.0) / dur.as_secs_f64()
}

fn calibrate(bytes: usize) -> u64 {
    let iters = (2.0 * 2e8 / bytes.max(1) as f64) as u64;
    iters.max(20)
}

fn bench(label: &str, source: &str) {
    let iters = calibrate(source.len());
    for _ in 0..5 {
        parse_sugar(source, "array").unwrap();
    }
    let start = Instant::now();
    for _ in 0..iters {
        parse_sugar(source, "array").unwrap();
    }
    let elapsed = start.elapsed();
    let mbs = mb_per_sec(source.len() as u64 * iters, elapsed);
    println!("  {label:<35} {mbs:8.2} MB/s  ({iters} iters in {:.2}s)", elapsed.as_secs_f64());
}

fn main() {
    println!("computo sugar-parser throughput");

    bench("short arithmetic", "1 + 2 * 3 - 4 / 2");

    let users_filter = "let active = filter($input/users, (u) => count(u/orders) > 0) in active";
    bench("let + filter + lambda", users_filter);

    let mut nested = "1".to_string();
    for i in 0..500 {
        nested = format!("let v{i} = {nested} + 1 in v{i}");
    }
    bench("500-deep let chain", &nested);
}
