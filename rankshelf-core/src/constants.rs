/// Initial Bradley-Terry strength assigned to every item before the first MM sweep.
/// Also the strength assumed for items that have never been fitted.
pub const INITIAL_STRENGTH: f64 = 1.0;

/// Default cap on MM iterations per fit.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default convergence threshold on the largest per-item strength change.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default mass of the symmetric virtual-tie prior added between every pair.
pub const DEFAULT_PRIOR_STRENGTH: f64 = 1.0;

/// Floor applied to every updated strength so later divisions never see zero.
pub const STRENGTH_FLOOR: f64 = 1e-12;

/// Lower bound on the min-max spread when rescaling onto 0-100.
/// With no spread every item lands on [`NEUTRAL_DISPLAY_SCORE`].
pub const SCALE_SPREAD_EPSILON: f64 = 1e-9;

/// Display value used whenever a 0-100 rescale has nothing to separate.
pub const NEUTRAL_DISPLAY_SCORE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Pair selection
// ---------------------------------------------------------------------------

/// Default upper bound on sampled candidate pairs per suggestion.
pub const DEFAULT_MAX_TRIES: usize = 200;

/// Sampling budget per eligible item; the effective budget is
/// `min(max_tries, pool_size * SAMPLES_PER_ITEM)`.
pub const SAMPLES_PER_ITEM: usize = 10;

/// Redraws allowed when the second pick of a sample lands on the first.
pub const SELF_PAIR_RETRIES: usize = 10;

/// Weight of strength closeness in the composite pair score.
pub const CLOSENESS_WEIGHT: f64 = 0.70;

/// Weight of pair freshness (few prior comparisons) in the composite pair score.
pub const FRESHNESS_WEIGHT: f64 = 0.30;

// ---------------------------------------------------------------------------
// Rank insertion (0-100 display scale, integer arithmetic)
// ---------------------------------------------------------------------------

/// Range an existing display score must fall in.
pub const MIN_DISPLAY_SCORE: i32 = 0;
pub const MAX_DISPLAY_SCORE: i32 = 100;

/// Score given to the very first item rated in a category.
pub const FIRST_RATING_SCORE: i32 = 85;

/// Highest score a non-tie insertion can produce.
pub const MAX_INSERT_SCORE: i32 = 99;

/// Lowest score a non-tie insertion can produce.
pub const MIN_INSERT_SCORE: i32 = 1;

/// Largest step taken past the current best or worst entry.
pub const MAX_EDGE_GAP: i32 = 8;

/// Below this many existing scores the sentiment bucket is ignored and the
/// whole list is searched.
pub const SMALL_LIST_THRESHOLD: usize = 5;

/// Search windows per sentiment bucket as `(lower, upper)` percentages of the
/// list length, truncated. `None` upper means "through the last entry".
pub const HIGH_BUCKET_PERCENT: (usize, Option<usize>) = (0, Some(35));
pub const MID_BUCKET_PERCENT: (usize, Option<usize>) = (30, Some(70));
pub const LOW_BUCKET_PERCENT: (usize, Option<usize>) = (65, None);

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Default weight of the fitted strength versus content similarity.
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Default per-facet weights of the blended Jaccard similarity.
pub const GENRE_WEIGHT: f64 = 0.5;
pub const DIRECTOR_WEIGHT: f64 = 0.3;
pub const CAST_WEIGHT: f64 = 0.2;

/// Average similarity assumed when no liked anchor carries features.
pub const NEUTRAL_SIMILARITY: f64 = 0.5;
