/// Catalog snapshot loading.
///
/// The CLI reads one JSON document describing a user's catalog: items with
/// optional category/score/features, recorded comparisons, pair history,
/// liked anchors and an unranked candidate pool. Every array is optional.
/// The snapshot is read-only; nothing is written back.
use anyhow::{Context, Result, bail};
use rankshelf_core::{Category, Comparison, ContentFeatures, ItemId, PairHistory, RatedItem};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
    pub comparisons: Vec<Comparison>,
    pub history: Vec<PairHistory>,
    pub liked: Vec<ItemId>,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default)]
    pub category: Option<Category>,
    /// Committed 0-100 score, if the item was already rated.
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub features: Option<ContentFeatures>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub id: ItemId,
    #[serde(default)]
    pub features: Option<ContentFeatures>,
}

impl Catalog {
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id.clone()).collect()
    }

    pub fn candidate_ids(&self) -> Vec<ItemId> {
        self.candidates.iter().map(|c| c.id.clone()).collect()
    }

    /// Features of ranked items and candidates alike. Candidates win on conflicts.
    pub fn feature_map(&self) -> HashMap<ItemId, ContentFeatures> {
        let ranked = self.items.iter().filter_map(|i| Some((i.id.clone(), i.features.clone()?)));
        let candidates = self.candidates.iter().filter_map(|c| Some((c.id.clone(), c.features.clone()?)));
        ranked.chain(candidates).collect()
    }

    /// Scored items of one category, sorted descending, excluding `except`.
    pub fn rated_in(&self, category: Category, except: &str) -> Vec<RatedItem> {
        let mut rated: Vec<RatedItem> = self
            .items
            .iter()
            .filter(|i| i.category == Some(category) && i.id != except)
            .filter_map(|i| Some(RatedItem::new(i.id.clone(), i.score?)))
            .collect();
        rated.sort_by(|a, b| b.score.cmp(&a.score));
        rated
    }
}

pub fn parse_catalog_str(content: &str) -> Result<Catalog> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Catalog::default());
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Load a catalog from a file, or from stdin when the path is `-`.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = if path == Path::new("-") {
        let mut stdin = io::stdin();
        if stdin.is_terminal() {
            bail!("No catalog provided. Pass --catalog <file> or pipe JSON via stdin.");
        }
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).context("Failed to read catalog from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?
    };
    parse_catalog_str(&content).with_context(|| format!("Failed to parse catalog {}", path.display()))
}
