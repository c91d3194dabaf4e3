/// Output formatting: terminal table and JSON.
use anyhow::Result;
use rankshelf_core::{FitReport, InsertionSession, Pair, Prediction, RankingEngine};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    item: &'a str,
    strength: f64,
    scaled: f64,
    comparisons: usize,
}

#[derive(Serialize)]
struct JsonRanking<'a> {
    items: Vec<JsonRankedItem<'a>>,
    total_comparisons: usize,
    iterations: usize,
    converged: bool,
}

#[derive(Serialize)]
struct JsonInsertion<'a> {
    item: &'a str,
    status: &'static str,
    score: Option<i32>,
    position: Option<usize>,
    tie: bool,
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>, header: &str) -> usize {
    names.map(str::len).max().unwrap_or(0).max(header.len())
}

/// Print fitted strengths as a formatted terminal table.
pub fn print_table(engine: &RankingEngine, report: &FitReport) {
    let width = name_width(report.strengths.iter().map(|s| s.item.as_str()), "Item");

    println!(" # | {:<width$} | Strength |  0-100 | Comparisons", "Item");
    println!("---|-{}-|----------|--------|------------", "-".repeat(width));

    for (i, s) in report.strengths.iter().enumerate() {
        println!(
            "{:>2} | {:<width$} | {:>8.4} | {:>6.1} | {:>11}",
            i + 1,
            s.item,
            s.strength,
            s.scaled,
            engine.games_played(&s.item),
        );
    }

    let convergence = if report.converged { "converged" } else { "not converged" };
    println!(
        "\n{} items ranked from {} comparisons ({} iterations, {convergence})",
        report.strengths.len(),
        engine.completed_comparison_count(),
        report.iterations,
    );
}

/// Print fitted strengths as JSON.
pub fn print_json(engine: &RankingEngine, report: &FitReport) -> Result<()> {
    let items = report
        .strengths
        .iter()
        .enumerate()
        .map(|(i, s)| JsonRankedItem {
            rank: i + 1,
            item: &s.item,
            strength: s.strength,
            scaled: s.scaled,
            comparisons: engine.games_played(&s.item),
        })
        .collect();

    let output = JsonRanking {
        items,
        total_comparisons: engine.completed_comparison_count(),
        iterations: report.iterations,
        converged: report.converged,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_pair(pair: Option<&Pair>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&pair)?);
        return Ok(());
    }
    match pair {
        Some((a, b)) => println!("Next comparison: {a}  vs  {b}"),
        None => println!("Not enough eligible items to compare. Rate a single item instead."),
    }
    Ok(())
}

pub fn print_predictions(predictions: &[Prediction], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(predictions)?);
        return Ok(());
    }
    let width = name_width(predictions.iter().map(|p| p.item.as_str()), "Candidate");
    println!(" # | {:<width$} | Predicted", "Candidate");
    println!("---|-{}-|----------", "-".repeat(width));
    for (i, p) in predictions.iter().enumerate() {
        println!("{:>2} | {:<width$} | {:>9.1}", i + 1, p.item, p.score);
    }
    Ok(())
}

pub fn print_insertion(item: &str, session: &InsertionSession, json: bool) -> Result<()> {
    let (status, score, position, tie) = match session {
        InsertionSession::Resolved { score, index, via_tie } => ("resolved", Some(*score), Some(*index), *via_tie),
        _ => ("cancelled", None, None, false),
    };
    if json {
        let output = JsonInsertion { item, status, score, position, tie };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    match score {
        Some(score) if tie => println!("\n{item}: {score} (tied with an existing entry)"),
        Some(score) => println!("\n{item}: {score}"),
        None => println!("\nCancelled. Nothing was rated."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_width_respects_header() {
        assert_eq!(name_width(["a", "bb"].into_iter(), "Item"), 4);
        assert_eq!(name_width(["a very long name"].into_iter(), "Item"), 16);
        assert_eq!(name_width(std::iter::empty(), "Candidate"), 9);
    }
}
