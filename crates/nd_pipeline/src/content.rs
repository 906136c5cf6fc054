//! Text selection shared by the processing stages.

use nd_core::{truncate_chars, ArticleRecord};

/// How much body text is appended to the title for embedding and classification.
pub const CONTEXT_CHARS: usize = 1024;

/// Full text shorter than this (after trimming) is not trusted as the article body.
pub const MIN_FULL_TEXT_CHARS: usize = 50;

/// `title + ". " + first 1024 characters of the body`.
pub fn context_input(record: &ArticleRecord) -> String {
    format!("{}. {}", record.title, truncate_chars(record.content_text(), CONTEXT_CHARS))
}

/// Picks the text sent for summarization. Never fails; returns an empty string
/// when the record carries nothing usable.
pub fn select_content(record: &ArticleRecord) -> String {
    if let Some(full_text) = record.full_text.as_deref().map(str::trim) {
        if full_text.chars().count() >= MIN_FULL_TEXT_CHARS {
            return full_text.to_string();
        }
    }

    let summary = [&record.feed_summary, &record.listing_summary]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty());
    let title = record.title.trim();

    match summary {
        Some(summary) if !title.is_empty() => format!("{}. {}", title, summary),
        Some(summary) => summary.to_string(),
        None => title.to_string(),
    }
}

/// False for empty text and for the bare `"."` left by joining two empty parts.
pub fn is_usable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed != "."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ArticleRecord {
        ArticleRecord::new("src", "A Title", "https://example.com/a")
    }

    #[test]
    fn test_context_input_truncates_body() {
        let body = "x".repeat(CONTEXT_CHARS + 100);
        let input = context_input(&record().with_full_text(body));
        assert_eq!(input.len(), "A Title. ".len() + CONTEXT_CHARS);
    }

    #[test]
    fn test_context_input_of_empty_record_is_a_dot() {
        let input = context_input(&ArticleRecord::new("src", "", "l"));
        assert_eq!(input.trim(), ".");
        assert!(!is_usable(&input));
    }

    #[test]
    fn test_select_content_prefers_long_full_text() {
        let full = "Researchers trained a model on a very large corpus of text.";
        let selected = select_content(&record().with_full_text(full).with_feed_summary("feed"));
        assert_eq!(selected, full);
    }

    #[test]
    fn test_select_content_short_full_text_falls_back_to_summary() {
        let selected = select_content(&record().with_full_text("too short").with_feed_summary("feed text"));
        assert_eq!(selected, "A Title. feed text");

        let selected = select_content(&record().with_listing_summary("blurb"));
        assert_eq!(selected, "A Title. blurb");
    }

    #[test]
    fn test_select_content_title_only() {
        assert_eq!(select_content(&record()), "A Title");

        let untitled = ArticleRecord::new("src", "", "l").with_feed_summary("only feed");
        assert_eq!(select_content(&untitled), "only feed");

        let empty = ArticleRecord::new("src", "  ", "l");
        assert_eq!(select_content(&empty), "");
        assert!(!is_usable(&select_content(&empty)));
    }
}
