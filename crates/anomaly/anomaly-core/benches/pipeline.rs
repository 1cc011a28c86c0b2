//! Performance benchmarks for the unusual range pipeline

use std::hint::black_box;
use std::time::Instant;

use anomaly_api::{DetectionConfig, TestPolicy};
use anomaly_core::{Garch11, UnusualRangePipeline};
use anomaly_spi::{RangeGrouper, TimeSeries, VolatilityModel};
use chrono::{Duration, NaiveDate};

fn generate_series(n: usize) -> TimeSeries {
    let origin = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid origin");
    let timestamps = (0..n).map(|i| origin + Duration::days(i as i64)).collect();
    let prices = (0..n)
        .map(|i| {
            let t = i as f64;
            let shock = if i % 97 == 0 { 25.0 } else { 0.0 };
            100.0 + (t * 0.1).sin() * 10.0 + (t * 0.37).cos() * 2.0 + shock
        })
        .collect();
    TimeSeries::from_parts(timestamps, prices).expect("valid series")
}

fn bench<F, R>(name: &str, iterations: u32, mut f: F)
where
    F: FnMut() -> R,
{
    // Warmup
    for _ in 0..3 {
        black_box(f());
    }

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(f());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations;

    println!(
        "{:30} {:>10.2?} total, {:>10.2?}/iter ({} iters)",
        name, elapsed, per_iter, iterations
    );
}

fn main() {
    println!("=== Unusual Range Benchmarks ===\n");

    let series_250 = generate_series(250);
    let series_1k = generate_series(1_000);
    let series_5k = generate_series(5_000);

    println!("--- GARCH(1,1) fit ---");
    let garch = Garch11::new();
    for (name, series, iters) in [
        ("GARCH fit (250)", &series_250, 50),
        ("GARCH fit (1K)", &series_1k, 20),
        ("GARCH fit (5K)", &series_5k, 5),
    ] {
        let changes = series.daily_changes();
        bench(name, iters, || garch.fit(&changes));
    }

    println!("\n--- Full pipeline ---");
    let volatility_only = UnusualRangePipeline::new(DetectionConfig::default()).expect("config");
    let combined = UnusualRangePipeline::new(
        DetectionConfig::default().with_test_policy(TestPolicy::Combined),
    )
    .expect("config");

    bench("Pipeline volatility-only (1K)", 20, || {
        volatility_only.analyze(&series_1k)
    });
    bench("Pipeline combined (1K)", 20, || combined.analyze(&series_1k));
    bench("Pipeline volatility-only (5K)", 5, || {
        volatility_only.analyze(&series_5k)
    });

    println!("\n--- Grouping ---");
    let grouper = anomaly_core::GapGrouper::default();
    let flagged: Vec<_> = series_5k
        .change_dates()
        .into_iter()
        .step_by(13)
        .collect();
    bench("Gap grouping (385 flags)", 1000, || grouper.group(&flagged));
}
