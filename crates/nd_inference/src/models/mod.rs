use std::sync::Arc;

use nd_core::{EmbeddingModel, Result, TextGenerator, ZeroShotClassifier};
use tracing::info;

use crate::{Backend, InferenceConfig};

pub mod dummy;
pub mod huggingface;
pub mod openai;

pub use dummy::{DummyClassifier, DummyEmbedder, DummyGenerator};
pub use huggingface::{HuggingFaceClassifier, HuggingFaceEmbedder};
pub use openai::{OpenAiEmbedder, OpenAiGenerator};

/// Models whose names start with this prefix are served by OpenAI rather than Hugging Face.
const OPENAI_EMBEDDING_PREFIX: &str = "text-embedding-";

pub fn create_embedder(config: &InferenceConfig) -> Result<Arc<dyn EmbeddingModel>> {
    let model: Arc<dyn EmbeddingModel> = match config.backend {
        Backend::Offline => Arc::new(DummyEmbedder::default()),
        Backend::Remote if config.embedding_model.starts_with(OPENAI_EMBEDDING_PREFIX) => {
            Arc::new(OpenAiEmbedder::new(
                config.openai_api_key.clone().unwrap_or_default(),
                &config.openai_base_url,
                config.embedding_model.clone(),
                config.request_timeout,
            )?)
        }
        Backend::Remote => Arc::new(HuggingFaceEmbedder::new(
            config.hf_api_token.clone(),
            &config.hf_base_url,
            config.embedding_model.clone(),
            config.request_timeout,
        )?),
    };
    info!("🔢 Embedding model: {}", model.name());
    Ok(model)
}

pub fn create_classifier(config: &InferenceConfig) -> Result<Arc<dyn ZeroShotClassifier>> {
    let model: Arc<dyn ZeroShotClassifier> = match config.backend {
        Backend::Offline => Arc::new(DummyClassifier::new()),
        Backend::Remote => Arc::new(HuggingFaceClassifier::new(
            config.hf_api_token.clone(),
            &config.hf_base_url,
            config.classifier_model.clone(),
            config.request_timeout,
        )?),
    };
    info!("🏷️ Classification model: {}", model.name());
    Ok(model)
}

/// Returns `None` when no generative API key is configured; callers then skip
/// summarization for the whole run.
pub fn create_generator(config: &InferenceConfig) -> Result<Option<Arc<dyn TextGenerator>>> {
    match config.backend {
        Backend::Offline => Ok(Some(Arc::new(DummyGenerator::new()))),
        Backend::Remote => match config.openai_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok(Some(Arc::new(OpenAiGenerator::new(
                key.to_string(),
                &config.openai_base_url,
                config.request_timeout,
            )?))),
            None => {
                info!("🔑 No generative API key configured; summaries will be skipped");
                Ok(None)
            }
        },
    }
}
