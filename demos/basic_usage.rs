//! Basic usage example for the doekit library.
//!
//! Generates a few designs, attaches simulated measurements and runs the
//! analysis entry points. Set `RUST_LOG=doekit=debug` to watch the
//! fallback chain.

use doekit::analysis::{
    correlation, describe, doe_anova, linear_regression, main_effects_anova, one_way_anova,
    rsm_quadratic,
};
use doekit::design::{
    box_behnken, check_sum_to_one, simplex_lattice, split_plot, SplitPlotSpec, TaguchiTable,
    MIXTURE_SUM_TOLERANCE,
};
use doekit::{DesignBuilder, Level};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("doekit - Basic Usage Example\n");

    // 2x3 factorial, replicated twice in a reproducible random order
    let design = DesignBuilder::new()
        .full_factorial(vec![2, 3])
        .randomize(Some(2024))
        .replicates(2)
        .build()?;
    println!("Randomized 2x3 factorial, 2 replicates ({} runs):", design.runs());
    println!("{design}");

    let y: Vec<f64> = design
        .iter_runs()
        .enumerate()
        .map(|(i, run)| {
            let a = run.get("F1").and_then(Level::as_f64).unwrap_or(0.0);
            let b = run.get("F2").and_then(Level::as_f64).unwrap_or(0.0);
            20.0 + 4.0 * a + 1.5 * b + if i % 2 == 0 { 0.3 } else { -0.3 }
        })
        .collect();
    let table = design.with_response("yield", y)?;
    let result = doe_anova(&table, "yield", &["F1", "F2"])?;
    println!("{result}");

    // Screening on an L8 array
    let l8 = DesignBuilder::new()
        .orthogonal_array(5, TaguchiTable::L8)
        .build()?;
    let y: Vec<f64> = l8
        .iter_runs()
        .enumerate()
        .map(|(i, run)| {
            let a = run.get("F1").and_then(Level::as_f64).unwrap_or(0.0);
            let c = run.get("F3").and_then(Level::as_f64).unwrap_or(0.0);
            50.0 - 6.0 * a + 2.0 * c + 0.2 * (i % 3) as f64
        })
        .collect();
    let table = l8.with_response("strength", y)?;
    let screening = main_effects_anova(&table, "strength", &["F1", "F2", "F3"], Some("L8 screening"))?;
    println!("{screening}");

    // Response surface on a Box-Behnken design
    let bb = box_behnken(3, 3)?;
    let y: Vec<f64> = bb
        .iter_runs()
        .enumerate()
        .map(|(i, run)| {
            let x: Vec<f64> = run.values().iter().filter_map(Level::as_f64).collect();
            80.0 + 3.0 * x[0] - 2.0 * x[1] * x[1] + x[0] * x[2] + 0.1 * (i % 3) as f64
        })
        .collect();
    let table = bb.with_response("conversion", y)?;
    let surface = rsm_quadratic(&table, "conversion", &["F1", "F2", "F3"], Some("Box-Behnken"))?;
    println!("{surface}");

    // General summaries of the same table
    let summary = describe(&table)?;
    for column in &summary.columns {
        println!(
            "{:<12} n={} mean={:.3} sd={:.3} [{:.3}, {:.3}]",
            column.name, column.count, column.mean, column.std, column.min, column.max
        );
    }
    let report = correlation(&table)?;
    for pair in &report.strong_pairs {
        println!("{} ~ {}: r = {:.3} ({})", pair.first, pair.second, pair.r, pair.strength);
    }
    let by_f1 = one_way_anova(&table, "conversion", "F1")?;
    println!(
        "One-way on F1: F = {:.3}, p = {:.4}",
        by_f1.f_statistic, by_f1.p_value
    );
    let line = linear_regression(&table, "conversion", &["F1", "F2", "F3"])?;
    println!("Linear fit: R² = {:.3}, RMSE = {:.3}", line.r_squared, line.rmse);

    // Three-component mixture
    let blends = simplex_lattice(3, 2, &["Resin".into(), "Filler".into(), "Binder".into()])?;
    check_sum_to_one(&blends, MIXTURE_SUM_TOLERANCE)?;
    println!("{{3,2}} simplex lattice ({} blends):", blends.runs());
    println!("{blends}");

    // Split-plot with a hard-to-change oven temperature
    let spec = SplitPlotSpec::new(vec![2], vec![2, 2])
        .randomized(true, true)
        .seeded(11, true);
    let plots = split_plot(&spec)?;
    println!("Split-plot ({} runs):", plots.runs());
    println!("{plots}");

    Ok(())
}
