use std::collections::BTreeSet;

use nd_core::{cosine_similarity, truncate_chars, ArticleRecord, Error, Logger, Result};
use nd_inference::EmbeddingGenerator;

use crate::content::context_input;

/// Inputs this short (after trimming) carry too little signal to be judged duplicates.
pub const MIN_EMBEDDING_CHARS: usize = 10;

pub const DEFAULT_THRESHOLD: f32 = 0.85;

pub fn validate_threshold(threshold: f32) -> Result<()> {
    if threshold.is_nan() || !(-1.0..=1.0).contains(&threshold) {
        return Err(Error::Config(format!(
            "similarity threshold must be within [-1, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

/// Greedy first-hit duplicate marking over index-aligned `links` and `embeddings`.
///
/// An index that is already marked is neither used as a source nor re-marked, so
/// chains are not merged: with A~B and B~C above threshold but A~C below, only B
/// is marked. Pairs sharing a link are never marked.
pub fn mark_duplicates(links: &[&str], embeddings: &[Vec<f32>], threshold: f32) -> BTreeSet<usize> {
    let n = links.len().min(embeddings.len());
    let mut marked = BTreeSet::new();
    for i in 0..n.saturating_sub(1) {
        if marked.contains(&i) {
            continue;
        }
        for j in (i + 1)..n {
            if marked.contains(&j) || links[i] == links[j] {
                continue;
            }
            if cosine_similarity(&embeddings[i], &embeddings[j]) >= threshold {
                marked.insert(j);
            }
        }
    }
    marked
}

/// Removes near-duplicate articles by embedding similarity.
pub struct Deduplicator {
    embeddings: EmbeddingGenerator,
    logger: Logger,
}

impl Deduplicator {
    pub fn new(embeddings: EmbeddingGenerator) -> Self {
        Self {
            embeddings,
            logger: Logger::new().with_prefix("Deduplicator:"),
        }
    }

    /// Returns the input minus the records marked as near-duplicates, in order.
    /// Fails only when the embedding service fails.
    pub async fn deduplicate(&self, records: Vec<ArticleRecord>, threshold: f32) -> Result<Vec<ArticleRecord>> {
        validate_threshold(threshold)?;
        if records.is_empty() {
            self.logger.info("No articles provided to deduplicate.");
            return Ok(records);
        }

        let mut eligible = Vec::new();
        let mut texts = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let text = context_input(record);
            if text.trim().chars().count() > MIN_EMBEDDING_CHARS {
                eligible.push(idx);
                texts.push(text);
            } else {
                self.logger.debug(&format!(
                    "Skipping '{}' due to insufficient content for embedding.",
                    truncate_chars(&record.title, 50)
                ));
            }
        }

        if texts.is_empty() {
            self.logger.info("No articles with sufficient content to generate embeddings.");
            return Ok(records);
        }

        self.logger.info(&format!(
            "Generating embeddings for {} articles with {}...",
            texts.len(),
            self.embeddings.model_name()
        ));
        let vectors = self.embeddings.generate_embeddings(&texts).await?;

        let links: Vec<&str> = eligible.iter().map(|&idx| records[idx].link.as_str()).collect();
        let marked: BTreeSet<usize> = mark_duplicates(&links, &vectors, threshold)
            .into_iter()
            .map(|pos| eligible[pos])
            .collect();

        if marked.is_empty() {
            self.logger.info(&format!("No duplicates found above the threshold of {}.", threshold));
            return Ok(records);
        }

        for &idx in &marked {
            let record = &records[idx];
            self.logger.debug(&format!(
                "Dropping duplicate ({}): '{}'",
                record.source,
                truncate_chars(&record.title, 80)
            ));
        }
        self.logger.info(&format!("Identified {} articles as duplicates.", marked.len()));

        let unique: Vec<ArticleRecord> = records
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !marked.contains(idx))
            .map(|(_, record)| record)
            .collect();
        self.logger.info(&format!("Returning {} unique articles.", unique.len()));
        Ok(unique)
    }
}
