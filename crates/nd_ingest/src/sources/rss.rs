use async_trait::async_trait;
use feed_rs::model::Entry;
use nd_core::{ArticleRecord, Error, Result, UNKNOWN_DATE};
use tracing::debug;

use crate::extract::{strip_html, DATE_FORMAT};
use crate::sources::{ArticleSource, SourceKind, SourceMetadata};

/// Placeholder for an entry without a title.
const MISSING: &str = "N/A";

#[derive(Debug, Clone)]
pub struct RssSource {
    name: String,
    url: String,
}

impl RssSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Parses an RSS or Atom document into records attributed to `source`.
/// Entries without a link are dropped.
pub fn parse_feed(source: &str, bytes: &[u8]) -> Result<Vec<ArticleRecord>> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| Error::Scraping(format!("Failed to parse feed from {}: {}", source, e)))?;
    debug!("Parsed {} entries from {}", feed.entries.len(), source);
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| entry_to_record(source, entry))
        .collect())
}

fn entry_to_record(source: &str, entry: Entry) -> Option<ArticleRecord> {
    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .unwrap_or_else(|| MISSING.to_string());
    let Some(link) = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
    else {
        debug!("Skipping '{}' from {}: entry has no link", title, source);
        return None;
    };
    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    let record = ArticleRecord::new(source, title, link).with_published_date(published);
    Some(match entry.summary.map(|s| strip_html(&s.content)) {
        Some(summary) if !summary.is_empty() => record.with_feed_summary(summary),
        _ => record,
    })
}

#[async_trait]
impl ArticleSource for RssSource {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: self.name.clone(),
            kind: SourceKind::Rss,
            url: self.url.clone(),
        }
    }

    async fn fetch_articles(&self, client: &reqwest::Client) -> Result<Vec<ArticleRecord>> {
        let response = client.get(&self.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        parse_feed(&self.name, &bytes)
    }
}
