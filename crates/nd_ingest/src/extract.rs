//! Text helpers for HTML pages and feed fragments.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use nd_core::{Error, Result, UNKNOWN_DATE};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Selectors tried in order when pulling the body out of an article page.
const BODY_SELECTORS: [&str; 3] = ["article p", "main p", "p"];

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Scraping(format!("Invalid selector '{}': {}", selector, e)))
}

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::Scraping(format!("Failed to parse URL '{}': {}", url, e)))
}

/// Text content of an element with runs of whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text of an HTML fragment such as a feed description.
pub fn strip_html(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    collapse_whitespace(&html.root_element().text().collect::<Vec<_>>().join(" "))
}

/// Paragraph text of an article page, paragraphs separated by blank lines.
/// Returns `None` when no selector yields any non-empty paragraph.
pub fn extract_full_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for selector in BODY_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|p| element_text(&p))
            .filter(|p| !p.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            return Some(paragraphs.join("\n\n"));
        }
    }
    None
}

/// Normalizes a loosely formatted listing date to `YYYY-MM-DD HH:MM:SS`,
/// or `"N/A"` when the text is not a recognizable date.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_utc().format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        return dt.format(DATE_FORMAT).to_string();
    }
    for format in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%b. %d, %Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return dt.format(DATE_FORMAT).to_string();
            }
        }
    }
    UNKNOWN_DATE.to_string()
}
