use std::fmt;

use async_trait::async_trait;

use crate::types::Classification;
use crate::Result;

/// Turns text into fixed-dimension vectors for similarity comparison.
#[async_trait]
pub trait EmbeddingModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Embeds every input; the output is index-aligned with `texts`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Scores a text against candidate labels without task-specific training.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        multi_label: bool,
    ) -> Result<Classification>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A chat-style text generation API.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Returns the completion text of a single choice.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
