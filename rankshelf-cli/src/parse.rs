/// Parsing of typed answers during interactive insertion.
///
/// Answers are case-insensitive and accept a letter, a digit or a word.
use rankshelf_core::{Judgment, Sentiment};

/// One parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer<T> {
    Value(T),
    Cancel,
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

fn is_cancel(s: &str) -> bool {
    matches!(s, "q" | "quit" | "cancel")
}

/// Parse a sentiment answer. `None` means "unrecognised, ask again".
pub fn parse_sentiment(input: &str) -> Option<Answer<Sentiment>> {
    let s = normalize(input);
    let sentiment = match s.as_str() {
        "h" | "high" | "loved" | "good" => Sentiment::High,
        "m" | "mid" | "fine" | "ok" | "okay" => Sentiment::Mid,
        "l" | "low" | "bad" | "disliked" => Sentiment::Low,
        other if is_cancel(other) => return Some(Answer::Cancel),
        _ => return None,
    };
    Some(Answer::Value(sentiment))
}

/// Parse a pairwise answer where option 1 is the new item.
pub fn parse_judgment(input: &str) -> Option<Answer<Judgment>> {
    let s = normalize(input);
    let judgment = match s.as_str() {
        "1" | "new" | "better" | "b" => Judgment::Better,
        "2" | "old" | "worse" | "w" => Judgment::Worse,
        "=" | "0" | "same" | "tie" | "t" => Judgment::Tie,
        other if is_cancel(other) => return Some(Answer::Cancel),
        _ => return None,
    };
    Some(Answer::Value(judgment))
}
