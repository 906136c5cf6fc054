use std::sync::Arc;
use std::time::Duration;

use nd_core::{
    truncate_chars, ArticleRecord, Error, GenerationRequest, Logger, SkipReason, SummaryOutcome, TextGenerator,
};

use crate::content::{is_usable, select_content};
use crate::prompt::{user_prompt, SYSTEM_PROMPT};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Pause inserted between consecutive API requests.
    pub request_delay: Duration,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// Writes a plain-language `popular_summary` on every record.
///
/// Without a generator (no API key) every record is marked skipped and no
/// request is made. Failures are stored on the record and the run continues.
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    settings: SummarySettings,
    logger: Logger,
}

impl Summarizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, settings: SummarySettings) -> Self {
        Self {
            generator,
            settings,
            logger: Logger::new().with_prefix("Summarizer:"),
        }
    }

    /// Summarizes records in input order. Only the first `limit` records with
    /// usable content are sent to the API; `None` means no limit.
    pub async fn summarize(&self, mut records: Vec<ArticleRecord>, limit: Option<usize>) -> Vec<ArticleRecord> {
        let Some(generator) = self.generator.as_ref() else {
            self.logger.warn("API key not configured; skipping summarization for all articles.");
            for record in records.iter_mut() {
                record.popular_summary = Some(SummaryOutcome::Skipped(SkipReason::MissingApiKey));
            }
            return records;
        };

        let total = records.len();
        let mut attempted = 0usize;
        for (i, record) in records.iter_mut().enumerate() {
            let content = select_content(record);
            if !is_usable(&content) {
                self.logger.info(&format!(
                    "[{}/{}] Insufficient content for '{}'.",
                    i + 1,
                    total,
                    record.link
                ));
                record.popular_summary = Some(SummaryOutcome::Skipped(SkipReason::InsufficientContent));
                continue;
            }

            if limit.is_some_and(|limit| attempted >= limit) {
                record.popular_summary = Some(SummaryOutcome::Skipped(SkipReason::LimitReached));
                continue;
            }

            if attempted > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }
            attempted += 1;

            self.logger.info(&format!(
                "[{}/{}] Requesting summary for '{}' from {}",
                i + 1,
                total,
                truncate_chars(&record.title, 80),
                generator.name()
            ));
            let outcome = self.summarize_content(generator.as_ref(), &record.title, &content).await;
            if let SummaryOutcome::Failed(reason) = &outcome {
                self.logger.error(&format!("Summary failed for '{}': {}", record.link, reason));
            }
            record.popular_summary = Some(outcome);
        }

        if let Some(limit) = limit {
            self.logger.info(&format!("Sent {} of at most {} articles to the API.", attempted, limit));
        }
        records
    }

    async fn summarize_content(&self, generator: &dyn TextGenerator, title: &str, content: &str) -> SummaryOutcome {
        let request = GenerationRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: user_prompt(title, content),
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match generator.generate(&request).await {
            Ok(text) if text.trim().is_empty() => {
                SummaryOutcome::Failed("Could not extract summary from API response.".to_string())
            }
            Ok(text) => SummaryOutcome::Summary(text.trim().to_string()),
            Err(Error::Summarization(reason)) => SummaryOutcome::Failed(reason),
            Err(e) => SummaryOutcome::Failed(e.to_string()),
        }
    }
}
