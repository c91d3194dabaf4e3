/// Binary-search insertion of one new item into a descending score list.
///
/// An explicit state machine: each transition consumes the session and
/// returns the next one, so the caller can park a session between user
/// answers and resume it with exactly one input. The existing list is shared
/// read-only through an `Arc`, so several sessions can run against one snapshot.
use std::fmt;
use std::sync::Arc;

use crate::constants::{
    FIRST_RATING_SCORE, HIGH_BUCKET_PERCENT, LOW_BUCKET_PERCENT, MAX_DISPLAY_SCORE, MAX_EDGE_GAP,
    MAX_INSERT_SCORE, MID_BUCKET_PERCENT, MIN_DISPLAY_SCORE, MIN_INSERT_SCORE, SMALL_LIST_THRESHOLD,
};
use crate::error::InsertionError;
use crate::types::RatedItem;

/// Coarse first impression of the new item relative to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sentiment {
    High,
    Mid,
    Low,
}

/// The user's answer to "is the new item better than this one?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Judgment {
    Better,
    Worse,
    Tie,
}

/// Stage name of a session, for errors and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStage {
    AwaitingSentiment,
    Searching,
    Resolved,
    Cancelled,
}

impl fmt::Display for InsertionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InsertionStage::AwaitingSentiment => "awaiting a sentiment",
            InsertionStage::Searching => "searching",
            InsertionStage::Resolved => "resolved",
            InsertionStage::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertionSession {
    AwaitingSentiment {
        scores: Arc<[RatedItem]>,
    },
    /// Binary search over `lower..=upper`; the user is asked about `current`.
    Searching {
        scores: Arc<[RatedItem]>,
        lower: usize,
        upper: usize,
        current: usize,
    },
    Resolved {
        score: i32,
        /// Insertion position in the existing list (opponent index for a tie).
        index: usize,
        via_tie: bool,
    },
    Cancelled,
}

impl InsertionSession {
    /// Start a session. `scores` must be sorted descending and lie within 0-100.
    pub fn begin(scores: impl Into<Arc<[RatedItem]>>) -> Result<Self, InsertionError> {
        let scores = scores.into();
        if let Some((index, r)) = scores
            .iter()
            .enumerate()
            .find(|(_, r)| !(MIN_DISPLAY_SCORE..=MAX_DISPLAY_SCORE).contains(&r.score))
        {
            return Err(InsertionError::OutOfRange { index, score: r.score });
        }
        if let Some(pos) = scores.windows(2).position(|w| w[0].score < w[1].score) {
            return Err(InsertionError::Unsorted { index: pos + 1 });
        }
        Ok(InsertionSession::AwaitingSentiment { scores })
    }

    pub fn stage(&self) -> InsertionStage {
        match self {
            InsertionSession::AwaitingSentiment { .. } => InsertionStage::AwaitingSentiment,
            InsertionSession::Searching { .. } => InsertionStage::Searching,
            InsertionSession::Resolved { .. } => InsertionStage::Resolved,
            InsertionSession::Cancelled => InsertionStage::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InsertionSession::Resolved { .. } | InsertionSession::Cancelled)
    }

    /// The entry the new item must be judged against next.
    pub fn opponent(&self) -> Option<&RatedItem> {
        match self {
            InsertionSession::Searching { scores, current, .. } => scores.get(*current),
            _ => None,
        }
    }

    /// Committed score once resolved.
    pub fn final_score(&self) -> Option<i32> {
        match self {
            InsertionSession::Resolved { score, .. } => Some(*score),
            _ => None,
        }
    }

    /// Supply the sentiment bucket. An empty list resolves immediately.
    pub fn with_sentiment(self, sentiment: Sentiment) -> Result<Self, InsertionError> {
        let scores = match self {
            InsertionSession::AwaitingSentiment { scores } => scores,
            other => {
                return Err(InsertionError::UnexpectedInput {
                    stage: other.stage(),
                    input: "a sentiment",
                });
            }
        };

        if scores.is_empty() {
            return Ok(InsertionSession::Resolved {
                score: FIRST_RATING_SCORE,
                index: 0,
                via_tie: false,
            });
        }

        let (lower, upper) = search_bounds(scores.len(), sentiment);
        Ok(InsertionSession::Searching {
            scores,
            lower,
            upper,
            current: midpoint(lower, upper),
        })
    }

    /// Feed one pairwise judgment against [`opponent`](Self::opponent).
    pub fn advance(self, judgment: Judgment) -> Result<Self, InsertionError> {
        let (scores, lower, upper, current) = match self {
            InsertionSession::Searching { scores, lower, upper, current } => (scores, lower, upper, current),
            other => {
                return Err(InsertionError::UnexpectedInput {
                    stage: other.stage(),
                    input: "a judgment",
                });
            }
        };

        let (lower, upper) = match judgment {
            // A tie freezes the score at the opponent's, without searching further.
            Judgment::Tie => {
                return Ok(InsertionSession::Resolved {
                    score: scores[current].score,
                    index: current,
                    via_tie: true,
                });
            }
            Judgment::Better => match current.checked_sub(1) {
                Some(upper) if upper >= lower => (lower, upper),
                _ => return Ok(resolve_at(&scores, lower)),
            },
            Judgment::Worse => (current + 1, upper),
        };

        if lower > upper {
            return Ok(resolve_at(&scores, lower));
        }
        Ok(InsertionSession::Searching {
            scores,
            lower,
            upper,
            current: midpoint(lower, upper),
        })
    }

    /// Abandon the session. Nothing is committed.
    pub fn cancel(self) -> Result<Self, InsertionError> {
        if self.is_terminal() {
            return Err(InsertionError::Terminal { stage: self.stage() });
        }
        Ok(InsertionSession::Cancelled)
    }
}

fn midpoint(lower: usize, upper: usize) -> usize {
    lower + (upper - lower) / 2
}

fn resolve_at(scores: &[RatedItem], index: usize) -> InsertionSession {
    InsertionSession::Resolved {
        score: resolve_score(scores, index),
        index,
        via_tie: false,
    }
}

/// Inclusive index range searched for a sentiment over a list of `total` entries.
///
/// Lists shorter than five are searched whole. `total` must be non-zero.
pub fn search_bounds(total: usize, sentiment: Sentiment) -> (usize, usize) {
    let last = total.saturating_sub(1);
    if total < SMALL_LIST_THRESHOLD {
        return (0, last);
    }

    let (lower_pct, upper_pct) = match sentiment {
        Sentiment::High => HIGH_BUCKET_PERCENT,
        Sentiment::Mid => MID_BUCKET_PERCENT,
        Sentiment::Low => LOW_BUCKET_PERCENT,
    };
    let lower = (total * lower_pct / 100).min(last);
    let upper = upper_pct.map_or(last, |pct| (total * pct / 100).min(last));

    if lower > upper { (0, last) } else { (lower, upper) }
}

/// Score for a new item inserted at `index` of a descending list.
///
/// Total over any `i32` scores; arithmetic is done in `i64`.
pub fn resolve_score(scores: &[RatedItem], index: usize) -> i32 {
    let (Some(best), Some(worst)) = (scores.first(), scores.last()) else {
        return FIRST_RATING_SCORE;
    };
    let (max, min, edge) = (i64::from(MAX_INSERT_SCORE), i64::from(MIN_INSERT_SCORE), i64::from(MAX_EDGE_GAP));

    let score = if index == 0 {
        let best = i64::from(best.score);
        let gap = edge.min((max - best) / 2);
        (best + gap).min(max)
    } else if index >= scores.len() {
        let worst = i64::from(worst.score);
        let gap = edge.min((worst - min) / 2);
        (worst - gap).max(min)
    } else {
        let above = i64::from(scores[index - 1].score);
        let below = i64::from(scores[index].score);
        match above - below {
            gap if gap <= 1 => below,
            2 => below + 1,
            _ => (above + below) / 2,
        }
    };
    clamp_to_i32(score)
}

fn clamp_to_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list(scores: &[i32]) -> Vec<RatedItem> {
        scores.iter().enumerate().map(|(i, &s)| RatedItem::new(format!("item-{i}"), s)).collect()
    }

    fn run(scores: &[i32], sentiment: Sentiment, answers: &[Judgment]) -> InsertionSession {
        let mut session = InsertionSession::begin(list(scores)).unwrap().with_sentiment(sentiment).unwrap();
        for &answer in answers {
            session = session.advance(answer).unwrap();
        }
        session
    }

    #[rstest]
    #[case(Sentiment::High)]
    #[case(Sentiment::Mid)]
    #[case(Sentiment::Low)]
    fn test_empty_list_scores_85(#[case] sentiment: Sentiment) {
        let session = run(&[], sentiment, &[]);
        assert_eq!(session.final_score(), Some(85));
    }

    #[test]
    fn test_new_top() {
        // Asked about 70 first, then 90.
        let session = run(&[90, 70, 50], Sentiment::High, &[Judgment::Better, Judgment::Better]);
        assert_eq!(session, InsertionSession::Resolved { score: 94, index: 0, via_tie: false });
    }

    #[test]
    fn test_new_bottom() {
        let session = run(&[90, 70, 50], Sentiment::Low, &[Judgment::Worse, Judgment::Worse]);
        assert_eq!(session, InsertionSession::Resolved { score: 42, index: 3, via_tie: false });
    }

    #[test]
    fn test_mid_gap() {
        let session = InsertionSession::begin(list(&[90, 80])).unwrap().with_sentiment(Sentiment::Mid).unwrap();
        assert_eq!(session.opponent().map(|r| r.score), Some(90));
        let session = session.advance(Judgment::Worse).unwrap();
        assert_eq!(session.opponent().map(|r| r.score), Some(80));
        let session = session.advance(Judgment::Better).unwrap();
        assert_eq!(session, InsertionSession::Resolved { score: 85, index: 1, via_tie: false });
    }

    #[test]
    fn test_small_gap_collapses_to_lower_neighbour() {
        let session = run(&[61, 60], Sentiment::Mid, &[Judgment::Worse, Judgment::Better]);
        assert_eq!(session.final_score(), Some(60));
    }

    #[test]
    fn test_tie_takes_opponent_score() {
        let session = run(&[90, 70, 50], Sentiment::Mid, &[Judgment::Tie]);
        assert_eq!(session, InsertionSession::Resolved { score: 70, index: 1, via_tie: true });
    }

    #[rstest]
    #[case(&[90, 70, 50], 0, 94)]
    #[case(&[98, 70], 0, 98)]
    #[case(&[99], 0, 99)]
    #[case(&[90, 70, 50], 3, 42)]
    #[case(&[4, 2], 2, 2)]
    #[case(&[9, 5], 2, 3)]
    #[case(&[1], 1, 1)]
    #[case(&[90, 80], 1, 85)]
    #[case(&[62, 60], 1, 61)]
    #[case(&[61, 60], 1, 60)]
    #[case(&[60, 60], 1, 60)]
    #[case(&[], 0, 85)]
    fn test_resolve_score(#[case] scores: &[i32], #[case] index: usize, #[case] expected: i32) {
        assert_eq!(resolve_score(&list(scores), index), expected);
    }

    #[rstest]
    #[case(&[i32::MAX, -5], 1, i32::MAX / 2 - 2)]
    #[case(&[i32::MAX, i32::MAX - 10], 1, i32::MAX - 5)]
    #[case(&[i32::MIN], 0, i32::MIN + 8)]
    #[case(&[i32::MIN], 1, 1)]
    #[case(&[i32::MAX], 0, 99)]
    fn test_resolve_score_extreme_scores(#[case] scores: &[i32], #[case] index: usize, #[case] expected: i32) {
        assert_eq!(resolve_score(&list(scores), index), expected);
    }

    #[rstest]
    #[case(&[i32::MAX, -5], 0, i32::MAX)]
    #[case(&[90, -5], 1, -5)]
    #[case(&[101], 0, 101)]
    fn test_begin_rejects_scores_off_the_display_scale(
        #[case] scores: &[i32],
        #[case] index: usize,
        #[case] score: i32,
    ) {
        let err = InsertionSession::begin(list(scores)).unwrap_err();
        assert_eq!(err, InsertionError::OutOfRange { index, score });
    }

    #[test]
    fn test_begin_accepts_scale_ends() {
        let session = run(&[100, 0], Sentiment::Mid, &[Judgment::Worse, Judgment::Better]);
        assert_eq!(session.final_score(), Some(50));
    }

    #[rstest]
    #[case(4, Sentiment::High, (0, 3))]
    #[case(4, Sentiment::Low, (0, 3))]
    #[case(20, Sentiment::High, (0, 7))]
    #[case(20, Sentiment::Mid, (6, 14))]
    #[case(20, Sentiment::Low, (13, 19))]
    #[case(5, Sentiment::Mid, (1, 3))]
    #[case(5, Sentiment::Low, (3, 4))]
    fn test_search_bounds(#[case] total: usize, #[case] sentiment: Sentiment, #[case] expected: (usize, usize)) {
        assert_eq!(search_bounds(total, sentiment), expected);
    }

    #[test]
    fn test_bucket_narrows_first_opponent() {
        let scores: Vec<i32> = (0..20).map(|i| 95 - i * 4).collect();
        let session = InsertionSession::begin(list(&scores)).unwrap().with_sentiment(Sentiment::High).unwrap();
        // Window 0..=7, first probe at 3.
        assert_eq!(session.opponent().map(|r| r.item.as_str()), Some("item-3"));
    }

    #[test]
    fn test_search_terminates_within_log_steps() {
        let scores: Vec<i32> = (0..64).map(|i| 99 - i).collect();
        let mut session = InsertionSession::begin(list(&scores)).unwrap().with_sentiment(Sentiment::Mid).unwrap();
        let mut steps = 0;
        while !session.is_terminal() {
            session = session.advance(Judgment::Better).unwrap();
            steps += 1;
        }
        assert!(steps <= 7, "took {steps} steps");
        assert!(session.final_score().is_some());
    }

    #[test]
    fn test_unsorted_list_rejected() {
        let err = InsertionSession::begin(list(&[50, 70, 40])).unwrap_err();
        assert_eq!(err, InsertionError::Unsorted { index: 1 });
    }

    #[test]
    fn test_cancel_from_any_live_stage() {
        let awaiting = InsertionSession::begin(list(&[90, 80])).unwrap();
        assert_eq!(awaiting.clone().cancel().unwrap(), InsertionSession::Cancelled);
        let searching = awaiting.with_sentiment(Sentiment::Mid).unwrap();
        assert_eq!(searching.cancel().unwrap(), InsertionSession::Cancelled);
    }

    #[test]
    fn test_terminal_sessions_reject_input() {
        let resolved = run(&[], Sentiment::High, &[]);
        assert_eq!(
            resolved.clone().cancel().unwrap_err(),
            InsertionError::Terminal { stage: InsertionStage::Resolved }
        );
        assert!(matches!(
            resolved.advance(Judgment::Better),
            Err(InsertionError::UnexpectedInput { stage: InsertionStage::Resolved, .. })
        ));
        assert!(matches!(
            InsertionSession::Cancelled.with_sentiment(Sentiment::Low),
            Err(InsertionError::UnexpectedInput { stage: InsertionStage::Cancelled, .. })
        ));
    }

    #[test]
    fn test_judgment_before_sentiment_rejected() {
        let session = InsertionSession::begin(list(&[90])).unwrap();
        let err = session.advance(Judgment::Worse).unwrap_err();
        assert_eq!(
            err,
            InsertionError::UnexpectedInput { stage: InsertionStage::AwaitingSentiment, input: "a judgment" }
        );
    }

    #[test]
    fn test_sessions_share_one_snapshot() {
        let snapshot: Arc<[RatedItem]> = list(&[90, 70, 50]).into();
        let a = InsertionSession::begin(Arc::clone(&snapshot)).unwrap();
        let b = InsertionSession::begin(Arc::clone(&snapshot)).unwrap();
        let a = a.with_sentiment(Sentiment::High).unwrap().advance(Judgment::Tie).unwrap();
        let b = b.with_sentiment(Sentiment::Low).unwrap().advance(Judgment::Worse).unwrap();
        assert_eq!(a.final_score(), Some(70));
        assert_eq!(b.opponent().map(|r| r.score), Some(50));
        assert_eq!(snapshot.len(), 3);
    }
}
