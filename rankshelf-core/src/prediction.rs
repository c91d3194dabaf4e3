/// Score prediction for items that have never been compared.
///
/// Blends the candidate's min-max scaled strength with its average content
/// similarity (weighted Jaccard over genres, directors and cast) to the
/// user's liked anchors.
use std::collections::{BTreeSet, HashMap};

use crate::bradley_terry::{display_span, to_display};
use crate::constants::{
    CAST_WEIGHT, DEFAULT_ALPHA, DIRECTOR_WEIGHT, GENRE_WEIGHT, INITIAL_STRENGTH, NEUTRAL_SIMILARITY,
};
use crate::types::{ContentFeatures, ItemId};

/// Per-facet weights of [`content_similarity`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimilarityWeights {
    pub genres: f64,
    pub directors: f64,
    pub cast: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        SimilarityWeights {
            genres: GENRE_WEIGHT,
            directors: DIRECTOR_WEIGHT,
            cast: CAST_WEIGHT,
        }
    }
}

/// Options for [`predict`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PredictionConfig {
    /// Share of the fitted strength in the blend; the rest is similarity. Clamped to 0..=1.
    pub alpha: f64,
    pub weights: SimilarityWeights,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        PredictionConfig {
            alpha: DEFAULT_ALPHA,
            weights: SimilarityWeights::default(),
        }
    }
}

impl PredictionConfig {
    fn effective_alpha(&self) -> f64 {
        if self.alpha.is_finite() { self.alpha.clamp(0.0, 1.0) } else { DEFAULT_ALPHA }
    }
}

/// A predicted 0-100 score for one candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prediction {
    pub item: ItemId,
    pub score: f64,
}

/// Intersection over union. Two empty sets score 0, not 1.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

pub fn content_similarity(a: &ContentFeatures, b: &ContentFeatures, weights: &SimilarityWeights) -> f64 {
    weights.genres * jaccard(&a.genres, &b.genres)
        + weights.directors * jaccard(&a.directors, &b.directors)
        + weights.cast * jaccard(&a.cast, &b.cast)
}

/// The candidate's strength on the 0-100 scale spanned by all known strengths.
/// Unknown candidates count as average; no spread means 50.
fn scaled_strength(candidate: &str, strengths: &HashMap<ItemId, f64>) -> f64 {
    let raw = strengths.get(candidate).copied().unwrap_or(INITIAL_STRENGTH);
    to_display(raw, display_span(strengths.values().copied())).clamp(0.0, 100.0)
}

/// Predict a 0-100 score for `candidate`.
///
/// Without features for the candidate, this is just its scaled strength.
pub fn predict(
    candidate: &str,
    strengths: &HashMap<ItemId, f64>,
    features: &HashMap<ItemId, ContentFeatures>,
    liked_anchors: &[ItemId],
    config: &PredictionConfig,
) -> f64 {
    let btl_scaled = scaled_strength(candidate, strengths);

    let Some(candidate_features) = features.get(candidate) else {
        return btl_scaled;
    };

    let sims: Vec<f64> = liked_anchors
        .iter()
        .filter_map(|anchor| features.get(anchor))
        .map(|anchor| content_similarity(candidate_features, anchor, &config.weights))
        .collect();
    let avg_similarity = if sims.is_empty() {
        NEUTRAL_SIMILARITY
    } else {
        sims.iter().sum::<f64>() / sims.len() as f64
    };

    let alpha = config.effective_alpha();
    (alpha * btl_scaled + (1.0 - alpha) * 100.0 * avg_similarity).clamp(0.0, 100.0)
}

/// Predict every candidate and sort by score descending (ties keep input order).
pub fn rank_candidates(
    candidates: &[ItemId],
    strengths: &HashMap<ItemId, f64>,
    features: &HashMap<ItemId, ContentFeatures>,
    liked_anchors: &[ItemId],
    config: &PredictionConfig,
) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = candidates
        .iter()
        .map(|c| Prediction {
            item: c.clone(),
            score: predict(c, strengths, features, liked_anchors, config),
        })
        .collect();
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    predictions
}
