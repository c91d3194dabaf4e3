/// Ranking engine orchestrator.
///
/// Holds one user's in-memory snapshot: item IDs, recorded comparisons and the
/// last fitted strengths. No IO: the caller loads the snapshot, feeds new
/// outcomes in, and persists whatever it reads back out.
use std::collections::{BTreeMap, HashMap, HashSet};

use rand::Rng;
use tracing::debug;

use crate::bradley_terry::{FitConfig, FitReport, fit_with_report};
use crate::pairing::{SelectorConfig, next_pair};
use crate::prediction::{Prediction, PredictionConfig, predict, rank_candidates};
use crate::types::{Comparison, ContentFeatures, ItemId, Pair, PairHistory, Strength};

/// Configuration for the ranking engine.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub fit: FitConfig,
    pub selector: SelectorConfig,
    pub prediction: PredictionConfig,
}

pub struct RankingEngine {
    item_ids: Vec<ItemId>,

    /// Every recorded comparison, unmodified.
    completed_comparisons: Vec<Comparison>,
    /// Comparisons per known item.
    games_played: HashMap<ItemId, usize>,

    /// Strengths from the last `refit`, keyed by item.
    current_strengths: HashMap<ItemId, f64>,
    last_fit: Option<FitReport>,

    config: EngineConfig,
}

impl RankingEngine {
    /// Duplicate IDs keep their first occurrence.
    pub fn new(item_ids: &[ItemId], config: EngineConfig) -> Self {
        let mut seen = HashSet::with_capacity(item_ids.len());
        let item_ids: Vec<ItemId> = item_ids.iter().filter(|id| seen.insert(id.as_str())).cloned().collect();
        let games_played = item_ids.iter().map(|id| (id.clone(), 0)).collect();

        RankingEngine {
            item_ids,
            completed_comparisons: Vec::new(),
            games_played,
            current_strengths: HashMap::new(),
            last_fit: None,
            config,
        }
    }

    /// Number of items being ranked.
    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record comparison outcomes. Strengths are stale until the next [`refit`](Self::refit).
    ///
    /// Only comparisons between two distinct known items count towards `games_played`.
    pub fn record_comparisons(&mut self, results: &[Comparison]) {
        for result in results {
            let counted = result.winner != result.loser
                && self.games_played.contains_key(&result.winner)
                && self.games_played.contains_key(&result.loser);
            if counted {
                for side in [&result.winner, &result.loser] {
                    if let Some(games) = self.games_played.get_mut(side) {
                        *games += 1;
                    }
                }
            }
            self.completed_comparisons.push(result.clone());
        }
    }

    /// Refit strengths from every recorded comparison.
    pub fn refit(&mut self) -> &FitReport {
        let report = fit_with_report(&self.item_ids, &self.completed_comparisons, &self.config.fit);
        debug!(
            comparisons = self.completed_comparisons.len(),
            iterations = report.iterations,
            "engine refit"
        );
        self.current_strengths = report.strengths.iter().map(|s| (s.item.clone(), s.strength)).collect();
        self.last_fit.insert(report)
    }

    /// Strengths from the last refit, sorted descending. Empty before the first refit.
    pub fn strengths(&self) -> &[Strength] {
        self.last_fit.as_ref().map(|r| r.strengths.as_slice()).unwrap_or_default()
    }

    pub fn strength_map(&self) -> &HashMap<ItemId, f64> {
        &self.current_strengths
    }

    pub fn last_fit(&self) -> Option<&FitReport> {
        self.last_fit.as_ref()
    }

    pub fn games_played(&self, item: &str) -> usize {
        self.games_played.get(item).copied().unwrap_or(0)
    }

    pub fn completed_comparisons(&self) -> &[Comparison] {
        &self.completed_comparisons
    }

    pub fn completed_comparison_count(&self) -> usize {
        self.completed_comparisons.len()
    }

    /// Per-pair counts derived from the recorded comparisons, in a stable order.
    pub fn pair_history(&self) -> Vec<PairHistory> {
        let mut counts: BTreeMap<(&str, &str), u32> = BTreeMap::new();
        for c in &self.completed_comparisons {
            if c.winner == c.loser {
                continue;
            }
            let key = if c.winner <= c.loser {
                (c.winner.as_str(), c.loser.as_str())
            } else {
                (c.loser.as_str(), c.winner.as_str())
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|((a, b), comparison_count)| PairHistory {
                item_a: a.to_owned(),
                item_b: b.to_owned(),
                comparison_count,
            })
            .collect()
    }

    /// Suggest the next comparison from current strengths and recorded history.
    pub fn suggest_pair(&self, blocklist: &HashSet<ItemId>, rng: &mut impl Rng) -> Option<Pair> {
        next_pair(
            &self.item_ids,
            &self.current_strengths,
            &self.pair_history(),
            blocklist,
            &self.config.selector,
            rng,
        )
    }

    /// Predicted 0-100 score for one candidate from current strengths.
    pub fn predict(
        &self,
        candidate: &str,
        features: &HashMap<ItemId, ContentFeatures>,
        liked_anchors: &[ItemId],
    ) -> f64 {
        predict(candidate, &self.current_strengths, features, liked_anchors, &self.config.prediction)
    }

    pub fn rank_candidates(
        &self,
        candidates: &[ItemId],
        features: &HashMap<ItemId, ContentFeatures>,
        liked_anchors: &[ItemId],
    ) -> Vec<Prediction> {
        rank_candidates(candidates, &self.current_strengths, features, liked_anchors, &self.config.prediction)
    }
}
