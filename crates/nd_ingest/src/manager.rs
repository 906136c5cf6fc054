use std::time::Duration;

use nd_core::{truncate_chars, ArticleRecord, Logger, Result};

use crate::extract::extract_full_text;
use crate::sources::{default_sources, ArticleSource, SourceMetadata};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_FULL_TEXT_DELAY: Duration = Duration::from_secs(1);
const USER_AGENT: &str = concat!("news-digest/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Fetch each article page and extract its paragraphs.
    pub fetch_full_text: bool,
    /// Pause between consecutive article page fetches.
    pub full_text_delay: Duration,
    pub timeout: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            fetch_full_text: true,
            full_text_delay: DEFAULT_FULL_TEXT_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Runs every source in turn and concatenates their records in source order.
pub struct IngestManager {
    client: reqwest::Client,
    sources: Vec<Box<dyn ArticleSource>>,
    options: IngestOptions,
    logger: Logger,
}

impl IngestManager {
    pub fn new(sources: Vec<Box<dyn ArticleSource>>, options: IngestOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            sources,
            options,
            logger: Logger::new().with_prefix("Ingest:"),
        })
    }

    pub fn with_default_sources(max_pages: usize, options: IngestOptions) -> Result<Self> {
        Self::new(default_sources(max_pages), options)
    }

    pub fn add_source(&mut self, source: Box<dyn ArticleSource>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> Vec<SourceMetadata> {
        self.sources.iter().map(|s| s.source_metadata()).collect()
    }

    /// Never fails: a source that cannot be fetched or parsed is logged and skipped.
    pub async fn ingest(&self) -> Vec<ArticleRecord> {
        let mut records = Vec::new();
        for source in &self.sources {
            let meta = source.source_metadata();
            self.logger
                .info(&format!("{} Processing source: {} ({})", meta.kind.emoji(), meta.name, meta.url));
            match source.fetch_articles(&self.client).await {
                Ok(found) => {
                    self.logger
                        .info(&format!("✅ Fetched {} articles from {}", found.len(), meta.name));
                    records.extend(found);
                }
                Err(e) => self
                    .logger
                    .error(&format!("❌ Could not fetch {}: {}", meta.name, e)),
            }
        }

        if self.options.fetch_full_text {
            self.attach_full_text(&mut records).await;
        }
        self.logger.info(&format!("📥 Ingested {} articles in total", records.len()));
        records
    }

    async fn attach_full_text(&self, records: &mut [ArticleRecord]) {
        let total = records.len();
        let mut fetched = 0usize;
        for (i, record) in records.iter_mut().enumerate() {
            if !record.link.starts_with("http") {
                continue;
            }
            if fetched > 0 && !self.options.full_text_delay.is_zero() {
                tokio::time::sleep(self.options.full_text_delay).await;
            }
            fetched += 1;

            match self.fetch_full_text(&record.link).await {
                Ok(Some(text)) => {
                    self.logger.debug(&format!(
                        "[{}/{}] {} characters from '{}'",
                        i + 1,
                        total,
                        text.chars().count(),
                        truncate_chars(&record.title, 60)
                    ));
                    record.full_text = Some(text);
                }
                Ok(None) => self
                    .logger
                    .debug(&format!("[{}/{}] No paragraph text at {}", i + 1, total, record.link)),
                Err(e) => self
                    .logger
                    .warn(&format!("[{}/{}] Full text unavailable for {}: {}", i + 1, total, record.link, e)),
            }
        }
    }

    pub async fn fetch_full_text(&self, link: &str) -> Result<Option<String>> {
        let html = self
            .client
            .get(link)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract_full_text(&html))
    }
}
