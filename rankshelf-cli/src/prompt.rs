/// Question text for the interactive insertion session.
use rankshelf_core::{Category, RatedItem};

/// Build the opening question: the coarse sentiment bucket for the new item.
pub fn build_sentiment_prompt(new_item: &str, category: Category, existing: usize) -> String {
    let context = if existing == 0 {
        format!("This is your first rated {category}.")
    } else {
        format!("You have rated {existing} other {category} item(s).")
    };
    format!(
        "{context}\n\
         How did you feel about \"{new_item}\"?\n\
         \x20 H: Loved it\n\
         \x20 M: It was fine\n\
         \x20 L: Didn't like it\n\
         (q to cancel) > "
    )
}

/// Build one pairwise question against an existing entry.
pub fn build_comparison_prompt(new_item: &str, opponent: &RatedItem, step: usize) -> String {
    format!(
        "[{step}] Which do you prefer?\n\
         \x20 1: {new_item}\n\
         \x20 2: {} (currently {})\n\
         \x20 =: About the same\n\
         (q to cancel) > ",
        opponent.item, opponent.score
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_prompt_mentions_item_and_options() {
        let prompt = build_sentiment_prompt("Dune", Category::Movie, 3);
        assert!(prompt.starts_with("You have rated 3 other movie item(s)."));
        assert!(prompt.contains("\"Dune\""));
        assert!(prompt.contains("  H: Loved it"));
        assert!(prompt.contains("  L: Didn't like it"));
    }

    #[test]
    fn test_first_rating_prompt() {
        let prompt = build_sentiment_prompt("Serial", Category::Podcast, 0);
        assert!(prompt.starts_with("This is your first rated podcast."));
    }

    #[test]
    fn test_comparison_prompt_contains_both_sides() {
        let prompt = build_comparison_prompt("Dune", &RatedItem::new("Heat", 91), 2);
        assert!(prompt.starts_with("[2] Which do you prefer?"));
        assert!(prompt.contains("  1: Dune"));
        assert!(prompt.contains("  2: Heat (currently 91)"));
    }
}
