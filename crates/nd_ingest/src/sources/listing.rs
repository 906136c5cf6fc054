use async_trait::async_trait;
use nd_core::{ArticleRecord, Result, UNKNOWN_DATE};
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::extract::{element_text, normalize_date, parse_selector, parse_url};
use crate::sources::{ArticleSource, SourceKind, SourceMetadata};

/// CSS selectors locating the parts of one listing entry. All but `item`
/// are evaluated relative to the item element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    pub item: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub blurb: String,
}

impl ListingSelectors {
    pub fn stanford_hai() -> Self {
        Self {
            item: "div.views-row, article.news-item".to_string(),
            title: "h3, h2, .title".to_string(),
            link: "a[href]".to_string(),
            date: "time, .date".to_string(),
            blurb: "p, .summary".to_string(),
        }
    }
}

/// A paginated HTML news listing (`?page=N`).
#[derive(Debug, Clone)]
pub struct ListingSource {
    name: String,
    url: String,
    selectors: ListingSelectors,
    max_pages: usize,
}

impl ListingSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, selectors: ListingSelectors) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selectors,
            max_pages: 1,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// URL of the zero-based listing page `page`; page 0 is the bare listing URL.
    pub fn page_url(&self, page: usize) -> Result<Url> {
        let mut url = parse_url(&self.url)?;
        if page > 0 {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        Ok(url)
    }
}

/// Extracts the entries of one listing page. Entries without a link are skipped
/// and relative links are resolved against `page_url`.
pub fn parse_listing(
    source: &str,
    html: &str,
    page_url: &Url,
    selectors: &ListingSelectors,
) -> Result<Vec<ArticleRecord>> {
    let item_selector = parse_selector(&selectors.item)?;
    let title_selector = parse_selector(&selectors.title)?;
    let link_selector = parse_selector(&selectors.link)?;
    let date_selector = parse_selector(&selectors.date)?;
    let blurb_selector = parse_selector(&selectors.blurb)?;

    let document = Html::parse_document(html);
    let mut records = Vec::new();
    for item in document.select(&item_selector) {
        let Some(anchor) = item.select(&link_selector).next() else {
            continue;
        };
        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| page_url.join(href.trim()).ok())
        else {
            debug!("Skipping listing entry without a usable link on {}", page_url);
            continue;
        };

        let title = item
            .select(&title_selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| element_text(&anchor));

        let published = item
            .select(&date_selector)
            .next()
            .map(|el| {
                el.value()
                    .attr("datetime")
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(&el))
            })
            .map(|raw| normalize_date(&raw))
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());

        let record = ArticleRecord::new(source, title, link.to_string()).with_published_date(published);
        let blurb = item
            .select(&blurb_selector)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty());
        records.push(match blurb {
            Some(blurb) => record.with_listing_summary(blurb),
            None => record,
        });
    }
    Ok(records)
}

#[async_trait]
impl ArticleSource for ListingSource {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: self.name.clone(),
            kind: SourceKind::Listing,
            url: self.url.clone(),
        }
    }

    async fn fetch_articles(&self, client: &reqwest::Client) -> Result<Vec<ArticleRecord>> {
        let mut records = Vec::new();
        for page in 0..self.max_pages {
            let url = self.page_url(page)?;
            let html = client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            let found = parse_listing(&self.name, &html, &url, &self.selectors)?;
            info!("📄 {} page {}: {} entries", self.name, page + 1, found.len());
            if found.is_empty() {
                break;
            }
            records.extend(found);
        }
        Ok(records)
    }
}
