/// Bradley-Terry-Luce strength fitting via minorize-maximize updates.
///
/// Weighted wins and ties, plus a symmetric virtual-tie prior between every
/// pair of items. Pure function of `(items, comparisons, config)`; the
/// internal `BradleyTerry` solver operates on pre-mapped `usize` indices.
use tracing::{debug, trace};

use crate::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_PRIOR_STRENGTH, DEFAULT_TOLERANCE, INITIAL_STRENGTH,
    NEUTRAL_DISPLAY_SCORE, SCALE_SPREAD_EPSILON, STRENGTH_FLOOR,
};
use crate::types::{Comparison, IdMap, IndexedComparison, ItemId, Strength};

/// Options for [`fit_strengths`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FitConfig {
    pub max_iterations: usize,
    /// Stop once the largest per-item change is at or below this.
    pub tolerance: f64,
    /// Mass of the virtual tie added between every pair. 0 disables the prior.
    pub prior_strength: f64,
    /// Rescale each sweep so the geometric mean of strengths is 1.
    pub normalize_geometric_mean: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            prior_strength: DEFAULT_PRIOR_STRENGTH,
            normalize_geometric_mean: true,
        }
    }
}

/// Fitted strengths plus convergence diagnostics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitReport {
    /// Sorted by strength descending.
    pub strengths: Vec<Strength>,
    /// MM sweeps actually run.
    pub iterations: usize,
    /// True when the last sweep's max change was within tolerance.
    pub converged: bool,
    /// Max per-item change of the last sweep (0.0 if none ran).
    pub final_delta: f64,
}

pub(crate) struct BradleyTerry {
    num_items: usize,
    /// wins[i][j]: weighted wins of i over j.
    wins: Vec<Vec<f64>>,
    /// matches[i][j]: weighted games between i and j (symmetric).
    matches: Vec<Vec<f64>>,
    /// Row sums of `wins`, precomputed.
    total_wins: Vec<f64>,
    pub scores: Vec<f64>,
}

impl BradleyTerry {
    pub fn new(num_items: usize, results: &[IndexedComparison], prior_strength: f64) -> Self {
        let mut wins = vec![vec![0.0; num_items]; num_items];
        let mut matches = vec![vec![0.0; num_items]; num_items];

        for &(w, l, weight, is_tie) in results {
            if is_tie {
                wins[w][l] += 0.5 * weight;
                wins[l][w] += 0.5 * weight;
            } else {
                wins[w][l] += weight;
            }
            matches[w][l] += weight;
            matches[l][w] += weight;
        }

        // Virtual tie between every pair keeps the graph connected.
        if prior_strength > 0.0 {
            for i in 0..num_items {
                for j in (i + 1)..num_items {
                    wins[i][j] += 0.5 * prior_strength;
                    wins[j][i] += 0.5 * prior_strength;
                    matches[i][j] += prior_strength;
                    matches[j][i] += prior_strength;
                }
            }
        }

        let total_wins = wins
            .iter()
            .enumerate()
            .map(|(i, row)| row.iter().enumerate().filter(|&(j, _)| j != i).map(|(_, w)| w).sum())
            .collect();

        BradleyTerry {
            num_items,
            wins,
            matches,
            total_wins,
            scores: vec![INITIAL_STRENGTH; num_items],
        }
    }

    /// One synchronous MM sweep: every update reads only the previous scores.
    fn run_iteration(&self) -> Vec<f64> {
        let mut new_scores = vec![0.0; self.num_items];

        for i in 0..self.num_items {
            let score_i = self.scores[i];
            let mut denominator = 0.0;

            for (j, &games) in self.matches[i].iter().enumerate() {
                if j == i || games <= 0.0 {
                    continue;
                }
                denominator += games / (score_i + self.scores[j]);
            }

            new_scores[i] = if denominator > 0.0 {
                (self.total_wins[i] / denominator).max(STRENGTH_FLOOR)
            } else {
                score_i
            };
        }

        new_scores
    }

    /// Divide by the geometric mean so it becomes exactly 1.
    fn normalize_scores(scores: &mut [f64]) {
        if scores.is_empty() {
            return;
        }
        let log_mean = scores.iter().map(|s| s.ln()).sum::<f64>() / scores.len() as f64;
        let factor = (-log_mean).exp();
        if factor.is_finite() && factor > 0.0 {
            for s in scores.iter_mut() {
                *s *= factor;
            }
        }
    }

    /// Iterate until the max change is within `tolerance` or `max_iterations` is hit.
    /// Returns `(iterations_run, converged, final_delta)`.
    pub fn calculate_scores(
        &mut self,
        max_iterations: usize,
        tolerance: f64,
        normalize: bool,
    ) -> (usize, bool, f64) {
        let mut delta = 0.0;
        for iteration in 0..max_iterations {
            let mut new_scores = self.run_iteration();
            if normalize {
                Self::normalize_scores(&mut new_scores);
            }

            delta = new_scores
                .iter()
                .zip(self.scores.iter())
                .map(|(new, old)| (new - old).abs())
                .fold(0.0_f64, f64::max);
            self.scores = new_scores;
            trace!(iteration, delta, "mm sweep");

            if delta <= tolerance {
                return (iteration + 1, true, delta);
            }
        }
        (max_iterations, false, delta)
    }

    #[cfg(test)]
    fn get_wins(&self, i: usize, j: usize) -> f64 {
        self.wins[i][j]
    }
}

/// `(min, spread)` of `values`, or `None` when the spread is within epsilon.
pub(crate) fn display_span(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let spread = max - min;
    (spread > SCALE_SPREAD_EPSILON).then_some((min, spread))
}

/// Place `value` on the 0-100 scale spanned by `span`. No span means 50.
pub(crate) fn to_display(value: f64, span: Option<(f64, f64)>) -> f64 {
    match span {
        Some((min, spread)) => (value - min) / spread * 100.0,
        None => NEUTRAL_DISPLAY_SCORE,
    }
}

/// Min-max rescale onto 0-100. A spread within epsilon maps everything to 50.
pub fn scale_to_display(values: &[f64]) -> Vec<f64> {
    let span = display_span(values.iter().copied());
    values.iter().map(|&v| to_display(v, span)).collect()
}

/// Fit strengths and return them sorted by strength descending.
///
/// Never fails: negative weights count as zero, unknown IDs are skipped,
/// and an empty item list yields an empty result.
pub fn fit_strengths(items: &[ItemId], comparisons: &[Comparison], config: &FitConfig) -> Vec<Strength> {
    fit_with_report(items, comparisons, config).strengths
}

/// Like [`fit_strengths`], also reporting how the MM iteration went.
pub fn fit_with_report(items: &[ItemId], comparisons: &[Comparison], config: &FitConfig) -> FitReport {
    let id_map = IdMap::from_ids(items);
    let num_items = id_map.len();
    let indexed = id_map.convert_comparisons(comparisons);

    let mut bt = BradleyTerry::new(num_items, &indexed, config.prior_strength);
    let (iterations, converged, final_delta) = bt.calculate_scores(
        config.max_iterations,
        config.tolerance,
        config.normalize_geometric_mean,
    );

    debug!(
        items = num_items,
        comparisons = indexed.len(),
        iterations,
        converged,
        final_delta,
        "bradley-terry fit finished"
    );

    let scaled = scale_to_display(&bt.scores);
    let mut strengths: Vec<Strength> = bt
        .scores
        .iter()
        .zip(scaled)
        .enumerate()
        .map(|(idx, (&strength, scaled))| Strength {
            item: id_map.to_id(idx).to_owned(),
            strength,
            scaled,
        })
        .collect();
    // Stable: equal strengths keep input order.
    strengths.sort_by(|a, b| b.strength.total_cmp(&a.strength));

    FitReport {
        strengths,
        iterations,
        converged,
        final_delta,
    }
}
