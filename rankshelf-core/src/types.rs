use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ParseCategoryError;

/// Caller-owned, opaque item identifier.
pub type ItemId = String;

/// One recorded pairwise outcome.
///
/// `weight` encodes intensity (1.0 = slight preference, 2.0 = strong).
/// For a tie, `winner`/`loser` are just the two sides; each receives half the weight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    pub winner: ItemId,
    pub loser: ItemId,
    #[cfg_attr(feature = "serde", serde(default = "default_weight"))]
    pub weight: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_tie: bool,
}

#[cfg(feature = "serde")]
fn default_weight() -> f64 {
    1.0
}

impl Comparison {
    /// `winner` preferred over `loser` with the given intensity.
    pub fn win(winner: impl Into<ItemId>, loser: impl Into<ItemId>, weight: f64) -> Self {
        Comparison {
            winner: winner.into(),
            loser: loser.into(),
            weight,
            is_tie: false,
        }
    }

    /// Neither side preferred.
    pub fn tie(a: impl Into<ItemId>, b: impl Into<ItemId>, weight: f64) -> Self {
        Comparison {
            winner: a.into(),
            loser: b.into(),
            weight,
            is_tie: true,
        }
    }

    /// Weight with negative and non-finite values clamped to zero.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() { self.weight.max(0.0) } else { 0.0 }
    }
}

/// A fitted latent strength.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strength {
    pub item: ItemId,
    /// Raw BTL strength, always > 0.
    pub strength: f64,
    /// Min-max rescale of `strength` onto 0-100. Display only.
    pub scaled: f64,
}

/// Content facets used by the prediction blender.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContentFeatures {
    pub genres: BTreeSet<String>,
    pub directors: BTreeSet<String>,
    pub cast: BTreeSet<String>,
}

/// How often the caller has already shown an (unordered) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairHistory {
    pub item_a: ItemId,
    pub item_b: ItemId,
    pub comparison_count: u32,
}

/// One entry of a 0-100 display score list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatedItem {
    pub item: ItemId,
    pub score: i32,
}

impl RatedItem {
    pub fn new(item: impl Into<ItemId>, score: i32) -> Self {
        RatedItem { item: item.into(), score }
    }
}

/// Catalog partition. Score lists are kept per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Movie,
    Show,
    Book,
    Podcast,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Movie => "movie",
            Category::Show => "show",
            Category::Book => "book",
            Category::Podcast => "podcast",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" | "film" => Ok(Category::Movie),
            "show" | "shows" | "tv" => Ok(Category::Show),
            "book" | "books" => Ok(Category::Book),
            "podcast" | "podcasts" => Ok(Category::Podcast),
            _ => Err(ParseCategoryError(s.to_owned())),
        }
    }
}

/// A suggested comparison: two distinct item IDs.
pub type Pair = (ItemId, ItemId);

/// Internal indexed comparison: (winner index, loser index, clamped weight, is_tie).
pub(crate) type IndexedComparison = (usize, usize, f64, bool);

/// Maps between caller-provided IDs and internal 0..N indices.
pub(crate) struct IdMap<'a> {
    ids: Vec<&'a str>,
    id_to_idx: HashMap<&'a str, usize>,
}

impl<'a> IdMap<'a> {
    /// First occurrence wins; later duplicates are dropped.
    pub fn from_ids(ids: &'a [ItemId]) -> Self {
        let mut id_to_idx = HashMap::with_capacity(ids.len());
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if id_to_idx.contains_key(id.as_str()) {
                warn!(item = %id, "duplicate item id ignored");
                continue;
            }
            id_to_idx.insert(id.as_str(), unique.len());
            unique.push(id.as_str());
        }
        IdMap { ids: unique, id_to_idx }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn to_idx(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }

    pub fn to_id(&self, idx: usize) -> &'a str {
        self.ids[idx]
    }

    /// Drops comparisons that reference unknown IDs or pit an item against itself.
    pub fn convert_comparisons(&self, comparisons: &[Comparison]) -> Vec<IndexedComparison> {
        comparisons
            .iter()
            .filter_map(|c| {
                let (Some(w), Some(l)) = (self.to_idx(&c.winner), self.to_idx(&c.loser)) else {
                    debug!(winner = %c.winner, loser = %c.loser, "comparison references unknown item, skipped");
                    return None;
                };
                if w == l {
                    return None;
                }
                Some((w, l, c.effective_weight(), c.is_tie))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_weight_clamps_malformed_values() {
        assert_eq!(Comparison::win("a", "b", -3.0).effective_weight(), 0.0);
        assert_eq!(Comparison::win("a", "b", f64::NAN).effective_weight(), 0.0);
        assert_eq!(Comparison::win("a", "b", f64::INFINITY).effective_weight(), 0.0);
        assert_eq!(Comparison::win("a", "b", 2.0).effective_weight(), 2.0);
    }

    #[test]
    fn test_category_round_trips_through_display() {
        for category in [Category::Movie, Category::Show, Category::Book, Category::Podcast] {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
        assert_eq!(" TV ".parse::<Category>(), Ok(Category::Show));
        assert!("vinyl".parse::<Category>().is_err());
    }

    #[test]
    fn test_id_map_skips_duplicates() {
        let ids: Vec<ItemId> = vec!["x".into(), "y".into(), "x".into()];
        let map = IdMap::from_ids(&ids);
        assert_eq!(map.len(), 2);
        assert_eq!(map.to_idx("x"), Some(0));
        assert_eq!(map.to_idx("y"), Some(1));
        assert_eq!(map.to_id(1), "y");
    }

    #[test]
    fn test_convert_comparisons_drops_unknown_and_self() {
        let ids: Vec<ItemId> = vec!["a".into(), "b".into()];
        let map = IdMap::from_ids(&ids);
        let comps = vec![
            Comparison::win("a", "b", 1.0),
            Comparison::win("a", "zzz", 1.0),
            Comparison::tie("b", "b", 1.0),
            Comparison::tie("b", "a", -1.0),
        ];
        let indexed = map.convert_comparisons(&comps);
        assert_eq!(indexed, vec![(0, 1, 1.0, false), (1, 0, 0.0, true)]);
    }
}
