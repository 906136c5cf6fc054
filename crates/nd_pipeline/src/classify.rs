use std::sync::Arc;

use nd_core::{truncate_chars, ArticleRecord, Classification, Error, Logger, Result, ZeroShotClassifier};

use crate::content::{context_input, is_usable};

pub const DEFAULT_CANDIDATE_LABELS: [&str; 6] = [
    "Research & Breakthroughs",
    "Industry Applications & Case Studies",
    "Ethics, Governance & Policy",
    "AI Tools, Platforms & Resources",
    "Market Trends & Investments",
    "Academic Conferences & Community Events",
];

pub fn default_candidate_labels() -> Vec<String> {
    DEFAULT_CANDIDATE_LABELS.iter().map(|s| s.to_string()).collect()
}

/// Assigns multi-label zero-shot topic scores to each article.
///
/// Never removes records and never fails the run: an article the service cannot
/// classify is labelled `Error`, one with no text is labelled `Unclassified`.
pub struct Classifier {
    model: Arc<dyn ZeroShotClassifier>,
    candidate_labels: Vec<String>,
    logger: Logger,
}

impl Classifier {
    pub fn new(model: Arc<dyn ZeroShotClassifier>, candidate_labels: Vec<String>) -> Result<Self> {
        if candidate_labels.is_empty() {
            return Err(Error::Config("at least one candidate label is required".to_string()));
        }
        Ok(Self {
            model,
            candidate_labels,
            logger: Logger::new().with_prefix("Classifier:"),
        })
    }

    pub fn candidate_labels(&self) -> &[String] {
        &self.candidate_labels
    }

    pub async fn classify(&self, mut records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
        if records.is_empty() {
            self.logger.info("No articles provided to classify.");
            return records;
        }

        let total = records.len();
        for (i, record) in records.iter_mut().enumerate() {
            let classification = self.classify_record(record).await;
            match classification.top_label().zip(classification.top_score()) {
                Some((label, score)) => self.logger.info(&format!(
                    "[{}/{}] '{}' -> {} ({:.4})",
                    i + 1,
                    total,
                    truncate_chars(&record.title, 80),
                    label,
                    score
                )),
                None => self.logger.warn(&format!("[{}/{}] empty classification", i + 1, total)),
            }
            record.classification = Some(classification);
        }
        records
    }

    pub async fn classify_record(&self, record: &ArticleRecord) -> Classification {
        let input = context_input(record);
        if !is_usable(&input) {
            self.logger.debug(&format!("Skipping '{}' due to empty content.", record.link));
            return Classification::unclassified();
        }

        match self.model.classify(&input, &self.candidate_labels, true).await {
            Ok(classification) if classification.labels.is_empty() => {
                self.logger.error(&format!("Empty result for '{}'.", truncate_chars(&record.title, 50)));
                Classification::error()
            }
            Ok(classification) if classification.labels.len() != classification.scores.len() => {
                self.logger.error(&format!(
                    "Misaligned labels and scores for '{}'.",
                    truncate_chars(&record.title, 50)
                ));
                Classification::error()
            }
            Ok(classification) if classification.is_sorted() => classification,
            Ok(classification) => {
                Classification::from_pairs(classification.labels.into_iter().zip(classification.scores).collect())
            }
            Err(e) => {
                self.logger.error(&format!(
                    "Could not classify '{}': {}",
                    truncate_chars(&record.title, 50),
                    e
                ));
                Classification::error()
            }
        }
    }
}
