use std::fmt;

use nd_core::{Classification, EmbeddingModel, GenerationRequest, Result, TextGenerator, ZeroShotClassifier};
use sha2::{Digest, Sha256};

pub const DEFAULT_DIMENSIONS: usize = 384;

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(|word| word.to_lowercase())
}

/// Offline embedder: a signed, hashed bag of words. Identical texts embed identically
/// and texts sharing vocabulary land close together.
pub struct DummyEmbedder {
    dimensions: usize,
}

impl DummyEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        for token in tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
                % self.dimensions;
            let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }
        embedding
    }
}

impl Default for DummyEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl fmt::Debug for DummyEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyEmbedder")
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

#[async_trait::async_trait]
impl EmbeddingModel for DummyEmbedder {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}

/// Offline classifier: scores each label by how many of its words (or their
/// five-letter stems) appear in the text.
#[derive(Debug, Default)]
pub struct DummyClassifier;

impl DummyClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text_tokens: &[String], label: &str) -> f32 {
        let label_words: Vec<String> = tokens(label).filter(|w| w != "and").collect();
        if label_words.is_empty() {
            return 0.0;
        }
        let hits = label_words
            .iter()
            .filter(|word| {
                let stem: String = word.chars().take(5).collect();
                text_tokens.iter().any(|t| t.starts_with(&stem))
            })
            .count();
        hits as f32 / label_words.len() as f32
    }
}

#[async_trait::async_trait]
impl ZeroShotClassifier for DummyClassifier {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        multi_label: bool,
    ) -> Result<Classification> {
        let text_tokens: Vec<String> = tokens(text).collect();
        let mut scores: Vec<f32> = candidate_labels
            .iter()
            .map(|label| Self::score(&text_tokens, label))
            .collect();

        if !multi_label {
            let total: f32 = scores.iter().sum();
            if total > 0.0 {
                scores.iter_mut().for_each(|s| *s /= total);
            }
        }

        Classification::new(candidate_labels.to_vec(), scores)
    }
}

/// Offline generator: echoes the first sentences of the fenced article content.
#[derive(Debug, Default)]
pub struct DummyGenerator;

impl DummyGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl TextGenerator for DummyGenerator {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = request
            .user_prompt
            .split("---")
            .nth(1)
            .unwrap_or(&request.user_prompt);
        let sentences: Vec<&str> = body
            .split(|c| c == '.' || c == '!' || c == '?')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(3)
            .collect();
        Ok(sentences.join(". ") + ".")
    }
}
