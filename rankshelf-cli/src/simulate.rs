/// Simulate command: checks how well pair suggestions plus refitting recover a hidden order.
///
/// Hidden strengths are 2^z with z ~ N(0,1). Each round asks the engine for the
/// next pair, draws the outcome from P(a beats b) = s_a / (s_a + s_b), records it
/// and refits. The report carries the Spearman correlation of fitted vs hidden order.
use anyhow::{Result, bail};
use rand::Rng;
use rankshelf_core::{Comparison, EngineConfig, ItemId, RankingEngine};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub items: usize,
    pub rounds_requested: usize,
    pub rounds_run: usize,
    pub iterations: usize,
    pub converged: bool,
    pub spearman: f64,
}

/// Box-Muller for N(0,1) samples, then 2^z for BTL strengths.
fn hidden_strengths(n: usize, rng: &mut impl Rng) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u1: f64 = rng.random::<f64>().max(1e-10);
            let u2: f64 = rng.random();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            2.0_f64.powf(z)
        })
        .collect()
}

/// 0-based rank of each value, ascending. Ties broken by position.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ranks[idx] = rank as f64;
    }
    ranks
}

/// Spearman rank correlation. Fewer than two values count as perfect agreement.
pub fn spearman(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 1.0;
    }
    let (ra, rb) = (ranks(&a[..n]), ranks(&b[..n]));
    let sum_sq: f64 = ra.iter().zip(&rb).map(|(x, y)| (x - y) * (x - y)).sum();
    let n = n as f64;
    1.0 - 6.0 * sum_sq / (n * (n * n - 1.0))
}

pub fn run_simulation(
    num_items: usize,
    rounds: usize,
    config: EngineConfig,
    rng: &mut impl Rng,
) -> Result<SimulationReport> {
    if num_items < 2 {
        bail!("Need at least 2 items to simulate, got {num_items}");
    }

    let ids: Vec<ItemId> = (1..=num_items).map(|i| format!("item-{i:03}")).collect();
    let hidden = hidden_strengths(num_items, rng);
    let hidden_by_id: HashMap<&str, f64> = ids.iter().map(String::as_str).zip(hidden.iter().copied()).collect();

    let mut engine = RankingEngine::new(&ids, config);
    let blocklist = HashSet::new();

    let mut rounds_run = 0;
    for round in 0..rounds {
        let Some((a, b)) = engine.suggest_pair(&blocklist, rng) else {
            debug!(round, "no pair available, stopping early");
            break;
        };
        let p_a = hidden_by_id[a.as_str()] / (hidden_by_id[a.as_str()] + hidden_by_id[b.as_str()]);
        let outcome = if rng.random::<f64>() < p_a {
            Comparison::win(a, b, 1.0)
        } else {
            Comparison::win(b, a, 1.0)
        };
        debug!(round, winner = %outcome.winner, loser = %outcome.loser, "simulated comparison");
        engine.record_comparisons(&[outcome]);
        engine.refit();
        rounds_run += 1;
    }

    let (iterations, converged) = {
        let report = engine.refit();
        (report.iterations, report.converged)
    };
    let fitted = engine.strength_map();
    let fitted: Vec<f64> = ids.iter().map(|id| fitted.get(id).copied().unwrap_or(0.0)).collect();
    let result = SimulationReport {
        items: num_items,
        rounds_requested: rounds,
        rounds_run,
        iterations,
        converged,
        spearman: spearman(&hidden, &fitted),
    };
    info!(items = num_items, rounds_run, spearman = result.spearman, "simulation finished");
    Ok(result)
}

pub fn print_report(report: &SimulationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("Items:            {}", report.items);
    println!("Rounds:           {} of {}", report.rounds_run, report.rounds_requested);
    let convergence = if report.converged { "converged" } else { "not converged" };
    println!("Final fit:        {} iterations ({convergence})", report.iterations);
    println!("Spearman (rho):   {:.4}", report.spearman);
    Ok(())
}
