/// Next-comparison suggestion.
///
/// Randomized search over unordered pairs of eligible items, preferring pairs
/// of near-equal strength (closest to a coin flip under BTL) that have rarely
/// been shown before. The random source is injected so results are
/// reproducible under a seeded generator.
use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::debug;

use crate::constants::{
    CLOSENESS_WEIGHT, DEFAULT_MAX_TRIES, FRESHNESS_WEIGHT, INITIAL_STRENGTH, SAMPLES_PER_ITEM,
    SELF_PAIR_RETRIES,
};
use crate::types::{ItemId, Pair, PairHistory};

/// Options for [`next_pair`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectorConfig {
    /// Upper bound on sampled pairs. The effective budget is also capped at 10x the pool.
    pub max_tries: usize,
    pub closeness_weight: f64,
    pub freshness_weight: f64,
    pub self_pair_retries: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            max_tries: DEFAULT_MAX_TRIES,
            closeness_weight: CLOSENESS_WEIGHT,
            freshness_weight: FRESHNESS_WEIGHT,
            self_pair_retries: SELF_PAIR_RETRIES,
        }
    }
}

/// Order-independent key for a pair of items: `new(a, b) == new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey<'a>(&'a str, &'a str);

impl<'a> PairKey<'a> {
    pub fn new(a: &'a str, b: &'a str) -> Self {
        if a <= b { PairKey(a, b) } else { PairKey(b, a) }
    }
}

/// Sum prior comparison counts per unordered pair, saturating at `u32::MAX`.
pub fn history_counts(history: &[PairHistory]) -> HashMap<PairKey<'_>, u32> {
    let mut counts: HashMap<PairKey<'_>, u32> = HashMap::with_capacity(history.len());
    for h in history {
        let count = counts.entry(PairKey::new(&h.item_a, &h.item_b)).or_insert(0);
        *count = count.saturating_add(h.comparison_count);
    }
    counts
}

/// Composite desirability of presenting a pair.
///
/// `closeness = 1 / (1 + |a - b|)`, `freshness = 1 / (1 + prior_count)`.
pub fn score_pair(strength_a: f64, strength_b: f64, prior_count: u32, config: &SelectorConfig) -> f64 {
    let closeness = 1.0 / (1.0 + (strength_a - strength_b).abs());
    let freshness = 1.0 / (1.0 + f64::from(prior_count));
    config.closeness_weight * closeness + config.freshness_weight * freshness
}

/// Suggest the next pair to compare, or `None` when fewer than two items are eligible.
///
/// Blocklisted IDs never appear. Items missing from `strengths` are treated as
/// average (strength 1.0). The first pair reaching the best composite wins.
pub fn next_pair(
    item_ids: &[ItemId],
    strengths: &HashMap<ItemId, f64>,
    history: &[PairHistory],
    blocklist: &HashSet<ItemId>,
    config: &SelectorConfig,
    rng: &mut impl Rng,
) -> Option<Pair> {
    let mut seen = HashSet::with_capacity(item_ids.len());
    let pool: Vec<&str> = item_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !blocklist.contains(*id) && seen.insert(*id))
        .collect();

    if pool.len() < 2 {
        return None;
    }

    let counts = history_counts(history);
    let strength_of = |id: &str| strengths.get(id).copied().unwrap_or(INITIAL_STRENGTH);
    let budget = config.max_tries.min(pool.len() * SAMPLES_PER_ITEM);

    let mut best: Option<(usize, usize, f64)> = None;

    for _ in 0..budget {
        let a = rng.random_range(0..pool.len());
        let mut b = rng.random_range(0..pool.len());
        let mut retries = 0;
        while b == a && retries < config.self_pair_retries {
            b = rng.random_range(0..pool.len());
            retries += 1;
        }
        if b == a {
            continue;
        }

        let (id_a, id_b) = (pool[a], pool[b]);
        let prior = counts.get(&PairKey::new(id_a, id_b)).copied().unwrap_or(0);
        let composite = score_pair(strength_of(id_a), strength_of(id_b), prior, config);

        if best.is_none_or(|(_, _, top)| composite > top) {
            best = Some((a, b, composite));
        }
    }

    best.map(|(a, b, composite)| {
        debug!(item_a = pool[a], item_b = pool[b], composite, "pair selected");
        (pool[a].to_owned(), pool[b].to_owned())
    })
}
