//! Hand-rolled timing harness, matching the teacher's own
//! `harness = false` benches: no `criterion` dependency, just calibrated
//! iteration counts and wall-clock timing printed to stdout.

use computo::{execute, Value};
use std::time::{Duration, Instant};

fn calibrate(approx_ns_per_iter: u64) -> u64 {
    let iters = (2_000_000_000u64 / approx_ns_per_iter.max(1)).max(50);
    iters.min(2_000_000)
}

fn bench(label: &str, script: &Value, inputs: &[Value]) {
    // Warmup.
    for _ in 0..5 {
        execute(script, inputs.to_vec()).unwrap();
    }
    let probe = Instant::now();
    execute(script, inputs.to_vec()).unwrap();
    let per_iter = probe.elapsed().as_nanos().max(1) as u64;

    let iters = calibrate(per_iter);
    let start = Instant::now();
    for _ in 0..iters {
        execute(script, inputs.to_vec()).unwrap();
    }
    let elapsed = start.elapsed();
    print_rate(label, iters, elapsed);
}

fn print_rate(label: &str, iters: u64, elapsed: Duration) {
    let per_sec = iters as f64 / elapsed.as_secs_f64();
    println!("  {label:<35} {per_sec:10.0} evals/s  ({iters} iters in {:.2}s)", elapsed.as_secs_f64());
}

fn main() {
    println!("computo eval throughput");

    let arithmetic = Value::from_json(serde_json::json!(
        ["let", [["x", 10], ["y", 20]], ["+", ["$", "/x"], ["$", "/y"]]]
    ));
    bench("let + arithmetic", &arithmetic, &[]);

    let users: Vec<serde_json::Value> = (0..200)
        .map(|i| serde_json::json!({"name": format!("user{i}"), "active": i % 2 == 0, "score": i}))
        .collect();
    let input = Value::from_json(serde_json::json!({"users": users}));
    let filter_map = Value::from_json(serde_json::json!([
        "map",
        ["filter", ["$input", "/users"], ["lambda", ["u"], ["get", ["$", "/u"], "/active"]]],
        ["lambda", ["u"], ["get", ["$", "/u"], "/name"]]
    ]));
    bench("filter+map over 200 users", &filter_map, &[input.clone()]);

    let sort_script = Value::from_json(serde_json::json!(["sort", ["$input", "/users"], "/score"]));
    bench("sort 200 objects by field", &sort_script, &[input]);

    let mut deep_if = Value::from_json(serde_json::json!(1));
    for _ in 0..200 {
        deep_if = Value::from_json(serde_json::json!(["if", true, deep_if.to_json(), 0]));
    }
    bench("200-deep tail-call if chain", &deep_if, &[]);
}
