//! Property-based tests for the ranking core.
//!
//! # Invariants tested
//!
//! - **Reciprocity:** mirrored outcomes yield reciprocal strength ratios.
//! - **Positivity:** every fitted strength is positive and finite, every
//!   scaled value lies in 0..=100, and output is sorted descending.
//! - **Uniform graphs:** a perfectly balanced round robin fits to equal strengths.
//! - **Pair eligibility:** suggestions never repeat an ID or use a blocklisted one.
//! - **Insertion:** every session terminates in O(log n) answers with a score
//!   that keeps the list ordered.
//! - **Prediction range:** predictions stay within 0..=100.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rankshelf_core::{
    Comparison, ContentFeatures, FitConfig, InsertionSession, ItemId, Judgment, PredictionConfig,
    RatedItem, SelectorConfig, Sentiment, fit_strengths, fit_with_report, next_pair, predict,
};

fn ids(n: usize) -> Vec<ItemId> {
    (0..n).map(|i| format!("item-{i}")).collect()
}

fn strength_of(result: &[rankshelf_core::Strength], id: &str) -> f64 {
    result
        .iter()
        .find(|s| s.item == id)
        .map(|s| s.strength)
        .unwrap_or_else(|| panic!("{id} missing from fit"))
}

fn comparison_strategy(num_items: usize) -> impl Strategy<Value = Comparison> {
    (0..num_items, 0..num_items, -2.0..5.0f64, any::<bool>()).prop_map(|(w, l, weight, is_tie)| Comparison {
        winner: format!("item-{w}"),
        loser: format!("item-{l}"),
        weight,
        is_tie,
    })
}

fn sentiment_strategy() -> impl Strategy<Value = Sentiment> {
    prop_oneof![Just(Sentiment::High), Just(Sentiment::Mid), Just(Sentiment::Low)]
}

fn judgment_strategy() -> impl Strategy<Value = Judgment> {
    prop_oneof![4 => Just(Judgment::Better), 4 => Just(Judgment::Worse), 1 => Just(Judgment::Tie)]
}

/// Descending 0-100 score list.
fn score_list_strategy() -> impl Strategy<Value = Vec<RatedItem>> {
    prop::collection::vec(0..=100i32, 0..40).prop_map(|mut scores| {
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores
            .into_iter()
            .enumerate()
            .map(|(i, s)| RatedItem::new(format!("rated-{i}"), s))
            .collect()
    })
}

#[test]
fn test_monotonic_dominance() {
    let items = ids(3);
    let mut comparisons = Vec::new();
    for _ in 0..3 {
        comparisons.push(Comparison::win("item-0", "item-1", 1.0));
        comparisons.push(Comparison::win("item-1", "item-2", 1.0));
        comparisons.push(Comparison::win("item-0", "item-2", 1.0));
    }
    let result = fit_strengths(&items, &comparisons, &FitConfig::default());
    let order: Vec<&str> = result.iter().map(|s| s.item.as_str()).collect();
    assert_eq!(order, vec!["item-0", "item-1", "item-2"]);
    assert!(strength_of(&result, "item-0") > strength_of(&result, "item-1"));
    assert!(strength_of(&result, "item-1") > strength_of(&result, "item-2"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: A beating B N times is the mirror image of B beating A N times.
    #[test]
    fn prop_reciprocal_strength_ratios(n in 1usize..12, weight in 0.5..3.0f64) {
        let items = ids(2);
        let forward: Vec<Comparison> = (0..n).map(|_| Comparison::win("item-0", "item-1", weight)).collect();
        let backward: Vec<Comparison> = (0..n).map(|_| Comparison::win("item-1", "item-0", weight)).collect();

        let f = fit_strengths(&items, &forward, &FitConfig::default());
        let b = fit_strengths(&items, &backward, &FitConfig::default());

        let ratio_forward = strength_of(&f, "item-0") / strength_of(&f, "item-1");
        let ratio_backward = strength_of(&b, "item-1") / strength_of(&b, "item-0");
        prop_assert!((ratio_forward - ratio_backward).abs() < 1e-6 * ratio_forward.max(1.0));
        prop_assert!(ratio_forward > 1.0);
    }

    /// Property: strengths stay positive and finite for arbitrary (even malformed) input.
    #[test]
    fn prop_strengths_positive_and_sorted(
        num_items in 1usize..7,
        comparisons in prop::collection::vec(comparison_strategy(8), 0..30),
        prior in prop_oneof![Just(0.0), Just(0.5), Just(1.0)],
    ) {
        let items = ids(num_items);
        let config = FitConfig { prior_strength: prior, ..FitConfig::default() };
        let report = fit_with_report(&items, &comparisons, &config);

        prop_assert_eq!(report.strengths.len(), num_items);
        prop_assert!(report.iterations <= config.max_iterations);
        for s in &report.strengths {
            prop_assert!(s.strength > 0.0 && s.strength.is_finite(), "bad strength {}", s.strength);
            prop_assert!((0.0..=100.0).contains(&s.scaled), "bad scaled {}", s.scaled);
        }
        for w in report.strengths.windows(2) {
            prop_assert!(w[0].strength >= w[1].strength);
        }
    }

    /// Property: a symmetric round robin fits every item to the same strength.
    #[test]
    fn prop_uniform_graph_is_neutral(num_items in 2usize..7, weight in 0.1..4.0f64, ties in any::<bool>()) {
        let items = ids(num_items);
        let mut comparisons = Vec::new();
        for i in 0..num_items {
            for j in (i + 1)..num_items {
                let (a, b) = (format!("item-{i}"), format!("item-{j}"));
                if ties {
                    comparisons.push(Comparison::tie(a, b, weight));
                } else {
                    comparisons.push(Comparison::win(a.clone(), b.clone(), weight));
                    comparisons.push(Comparison::win(b, a, weight));
                }
            }
        }
        let result = fit_strengths(&items, &comparisons, &FitConfig::default());
        for s in &result {
            prop_assert!((s.strength - 1.0).abs() < 1e-6);
            prop_assert_eq!(s.scaled, 50.0);
        }
    }

    /// Property: suggestions are two distinct, eligible pool members.
    #[test]
    fn prop_pair_selector_respects_eligibility(
        num_items in 0usize..12,
        blocked in prop::collection::hash_set(0usize..12, 0..6),
        seed in any::<u64>(),
    ) {
        let items = ids(num_items);
        let blocklist: HashSet<ItemId> = blocked.iter().map(|i| format!("item-{i}")).collect();
        let eligible = items.iter().filter(|id| !blocklist.contains(*id)).count();
        let mut rng = StdRng::seed_from_u64(seed);

        let pair = next_pair(&items, &HashMap::new(), &[], &blocklist, &SelectorConfig::default(), &mut rng);

        match pair {
            None => prop_assert!(eligible < 2),
            Some((a, b)) => {
                prop_assert!(eligible >= 2);
                prop_assert_ne!(&a, &b);
                prop_assert!(!blocklist.contains(&a) && !blocklist.contains(&b));
                prop_assert!(items.contains(&a) && items.contains(&b));
            }
        }
    }

    /// Property: insertion terminates quickly and never breaks the ordering.
    #[test]
    fn prop_insertion_terminates_ordered(
        scores in score_list_strategy(),
        sentiment in sentiment_strategy(),
        answers in prop::collection::vec(judgment_strategy(), 8),
    ) {
        let mut session = InsertionSession::begin(scores.clone()).unwrap().with_sentiment(sentiment).unwrap();
        let mut answers = answers.into_iter();
        let mut steps = 0;
        while !session.is_terminal() {
            let opponent = session.opponent().cloned().unwrap();
            let answer = answers.next().unwrap_or(Judgment::Better);
            session = session.advance(answer).unwrap();
            steps += 1;
            if answer == Judgment::Tie {
                prop_assert_eq!(session.final_score(), Some(opponent.score));
            }
        }
        // ceil(log2(40)) + 1
        prop_assert!(steps <= 7, "took {} steps", steps);

        match session {
            InsertionSession::Resolved { score, via_tie: false, index } => {
                if scores.is_empty() {
                    prop_assert_eq!(score, 85);
                } else if index > 0 && index < scores.len() {
                    prop_assert!(scores[index].score <= score && score <= scores[index - 1].score);
                } else {
                    prop_assert!((0..=100).contains(&score));
                }
            }
            InsertionSession::Resolved { via_tie: true, .. } => {}
            other => prop_assert!(false, "unexpected terminal session {:?}", other),
        }
    }

    /// Property: predictions stay on the display scale, and without features equal the scaled strength.
    #[test]
    fn prop_prediction_in_range(
        raw in prop::collection::vec(0.001..100.0f64, 0..6),
        alpha in -1.0..2.0f64,
        with_features in any::<bool>(),
    ) {
        let strengths: HashMap<ItemId, f64> = raw.iter().enumerate().map(|(i, s)| (format!("item-{i}"), *s)).collect();
        let mut features: HashMap<ItemId, ContentFeatures> = HashMap::new();
        if with_features {
            let mut f = ContentFeatures::default();
            f.genres.insert("drama".into());
            features.insert("item-0".into(), f.clone());
            features.insert("item-1".into(), f);
        }
        let liked = vec!["item-1".to_string()];
        let config = PredictionConfig { alpha, ..PredictionConfig::default() };

        let score = predict("item-0", &strengths, &features, &liked, &config);
        prop_assert!((0.0..=100.0).contains(&score));

        if !with_features {
            let baseline = predict("item-0", &strengths, &features, &[], &PredictionConfig::default());
            prop_assert_eq!(score, baseline);
        }
    }
}
