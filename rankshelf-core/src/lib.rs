//! rankshelf-core: Pure-computation preference ranking for a personal catalog.
//!
//! Pairwise judgments → Bradley-Terry strengths → next-pair suggestions,
//! binary-search insertion of new ratings, and score predictions for items
//! never compared. No IO; the caller owns the data.
//!
//! Items are identified by caller-provided string IDs. Comparisons that
//! mention unknown IDs are skipped rather than rejected.
//!
//! # Quick start
//!
//! ```rust
//! use rankshelf_core::{fit_strengths, Comparison, FitConfig};
//!
//! let items: Vec<String> = vec!["dune".into(), "arrival".into(), "tenet".into()];
//! let comparisons = vec![
//!     Comparison::win("dune", "tenet", 2.0),
//!     Comparison::win("arrival", "tenet", 1.0),
//!     Comparison::tie("dune", "arrival", 1.0),
//! ];
//!
//! let strengths = fit_strengths(&items, &comparisons, &FitConfig::default());
//! assert_eq!(strengths.last().unwrap().item, "tenet");
//! for s in &strengths {
//!     println!("{}: {:.3} ({:.0}/100)", s.item, s.strength, s.scaled);
//! }
//! ```
//!
//! Inserting a new rating without refitting:
//!
//! ```rust
//! use rankshelf_core::{InsertionSession, Judgment, RatedItem, Sentiment};
//!
//! let existing = vec![RatedItem::new("a", 90), RatedItem::new("b", 80)];
//! let session = InsertionSession::begin(existing)?
//!     .with_sentiment(Sentiment::Mid)?
//!     .advance(Judgment::Worse)?   // vs "a"
//!     .advance(Judgment::Better)?; // vs "b"
//! assert_eq!(session.final_score(), Some(85));
//! # Ok::<(), rankshelf_core::InsertionError>(())
//! ```

pub mod bradley_terry;
pub mod constants;
pub mod engine;
pub mod error;
pub mod insertion;
pub mod pairing;
pub mod prediction;
pub mod types;

// Re-export primary public API at crate root.
pub use bradley_terry::{FitConfig, FitReport, fit_strengths, fit_with_report, scale_to_display};
pub use engine::{EngineConfig, RankingEngine};
pub use error::{InsertionError, ParseCategoryError};
pub use insertion::{InsertionSession, InsertionStage, Judgment, Sentiment, resolve_score, search_bounds};
pub use pairing::{PairKey, SelectorConfig, history_counts, next_pair, score_pair};
pub use prediction::{
    Prediction, PredictionConfig, SimilarityWeights, content_similarity, jaccard, predict,
    rank_candidates,
};
pub use types::{
    Category, Comparison, ContentFeatures, ItemId, Pair, PairHistory, RatedItem, Strength,
};
