use std::time::Duration;

pub mod embeddings;
pub mod models;

pub use embeddings::EmbeddingGenerator;
pub use models::{create_classifier, create_embedder, create_generator};

/// Where the model services live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Hosted APIs (Hugging Face inference, OpenAI).
    #[default]
    Remote,
    /// Deterministic in-process models; no network access.
    Offline,
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub backend: Backend,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub hf_api_token: Option<String>,
    pub hf_base_url: String,
    pub embedding_model: String,
    pub classifier_model: String,
    pub request_timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Remote,
            openai_api_key: None,
            openai_base_url: models::openai::DEFAULT_BASE_URL.to_string(),
            hf_api_token: None,
            hf_base_url: models::huggingface::DEFAULT_BASE_URL.to_string(),
            embedding_model: models::huggingface::DEFAULT_EMBEDDING_MODEL.to_string(),
            classifier_model: models::huggingface::DEFAULT_CLASSIFIER_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

pub mod prelude {
    pub use super::{Backend, EmbeddingGenerator, InferenceConfig};
    pub use super::models::{create_classifier, create_embedder, create_generator};
    pub use nd_core::{Error, Result};
}
