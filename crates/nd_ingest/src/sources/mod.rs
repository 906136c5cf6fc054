use std::fmt;

use async_trait::async_trait;
use nd_core::{ArticleRecord, Result};

pub mod listing;
pub mod rss;

pub use listing::{ListingSelectors, ListingSource};
pub use rss::RssSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Rss,
    Listing,
}

impl SourceKind {
    pub fn emoji(&self) -> &'static str {
        match self {
            SourceKind::Rss => "📡",
            SourceKind::Listing => "🕸️",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Rss => f.write_str("rss"),
            SourceKind::Listing => f.write_str("listing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name, kind and entry URL of the source
    fn source_metadata(&self) -> SourceMetadata;

    /// Fetches the current articles. Records carry no full text yet.
    async fn fetch_articles(&self, client: &reqwest::Client) -> Result<Vec<ArticleRecord>>;
}

pub const GOOGLE_AI_BLOG_FEED: &str = "https://blog.google/technology/ai/rss/";
pub const MIT_TECH_REVIEW_FEED: &str = "https://www.technologyreview.com/feed/";
pub const STANFORD_HAI_NEWS: &str = "https://hai.stanford.edu/news";

/// The two RSS feeds and the Stanford HAI listing, fetching `max_pages` listing pages.
pub fn default_sources(max_pages: usize) -> Vec<Box<dyn ArticleSource>> {
    vec![
        Box::new(RssSource::new("Google AI Blog", GOOGLE_AI_BLOG_FEED)),
        Box::new(RssSource::new("MIT Technology Review", MIT_TECH_REVIEW_FEED)),
        Box::new(ListingSource::new("Stanford HAI", STANFORD_HAI_NEWS, ListingSelectors::stanford_hai()).with_max_pages(max_pages)),
    ]
}
