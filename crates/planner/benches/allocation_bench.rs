//! Benchmarks for the budget allocation engine.
//! Run with: cargo bench -p campaign-planner

use campaign_core::CampaignParameters;
use campaign_planner::plan;
use chrono::{Duration, NaiveDate};
use rust_decimal_macros::dec;

fn campaign(days: i64) -> CampaignParameters {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    CampaignParameters {
        start_date: start,
        end_date: start + Duration::days(days - 1),
        target_revenue: dec!(2500000),
        target_aov: dec!(1280),
        target_conversion_rate_pct: dec!(1.8),
        cost_per_click: dec!(6.5),
    }
}

fn main() {
    let inputs: Vec<CampaignParameters> = [3, 7, 30, 90, 365].into_iter().map(campaign).collect();

    // Warmup
    for params in &inputs {
        plan(params.clone()).unwrap();
    }

    let iterations: u32 = 20_000;
    println!("=== Allocation Benchmark ===");
    for params in &inputs {
        let start = std::time::Instant::now();
        for _ in 0..iterations {
            let _ = plan(params.clone()).unwrap();
        }
        let elapsed = start.elapsed();
        let days = (params.end_date - params.start_date).num_days() + 1;
        println!(
            "{:>4} days: {:?} per plan ({:.0} plans/sec)",
            days,
            elapsed / iterations,
            iterations as f64 / elapsed.as_secs_f64()
        );
    }
}
