//! Basic example demonstrating unusual range detection
//!
//! Run with: cargo run --example basic -p anomaly

use anomaly::prelude::*;

fn main() -> Result<()> {
    println!("=== Unusual Range Detection ===\n");

    // Quiet drift with a burst of large moves in the middle of the month.
    let mut time = Vec::new();
    let mut price = Vec::new();
    let mut level = 100.0;
    for day in 1..=30 {
        time.push(format!("2024-03-{:02}", day));
        price.push(level);
        let step = match day {
            12 => 14.0,
            13 => -11.0,
            14 => 12.5,
            _ => if day % 2 == 0 { 0.4 } else { -0.3 },
        };
        level += step;
    }
    let input = PriceSeriesInput::new(time, price);

    // 1. One-shot helper
    println!("1. unusual_ranges (confidence level 0.05)");
    match unusual_ranges(&input, 0.05) {
        Ok(ranges) => {
            for range in &ranges {
                println!("   {} .. {}", range.start(), range.end());
            }
        }
        Err(e) => println!("   {}", e),
    }

    // 2. Configured pipeline with a full report
    println!("\n2. Pipeline report (median gap threshold, longest first)");
    let config = DetectionConfig::new(0.01)
        .with_gap_policy(GapThresholdPolicy::Median)
        .with_ordering(RangeOrdering::SpanDescending);
    let pipeline = UnusualRangePipeline::new(config)?;
    let report = pipeline.analyze(&input.to_time_series()?)?;

    println!("   Model: {}", report.model);
    println!("   Flagged days: {}", report.mask.count());
    println!("   Critical value: {:.3}", report.mask.critical_value);
    for range in &report.ranges {
        println!("   {} .. {}", range.start(), range.end());
    }

    // 3. Fitted volatility parameters
    println!("\n3. GARCH(1,1) fit");
    let fit = Garch11::new().fit_model(&input.to_time_series()?.daily_changes())?;
    println!(
        "   omega={:.4} alpha={:.4} beta={:.4} persistence={:.4}",
        fit.omega,
        fit.alpha,
        fit.beta,
        fit.persistence()
    );

    Ok(())
}
