use std::sync::Arc;

use nd_core::{EmbeddingModel, Error, Result};
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Embeds arbitrarily many texts by splitting them into sub-batches, keeping
/// output order aligned with input order.
#[derive(Debug, Clone)]
pub struct EmbeddingGenerator {
    model: Arc<dyn EmbeddingModel>,
    batch_size: usize,
}

impl EmbeddingGenerator {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            model,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(self.batch_size).enumerate() {
            debug!("Embedding batch {} ({} texts)", i + 1, chunk.len());
            let batch = self.model.embed_batch(chunk).await?;
            if batch.len() != chunk.len() {
                return Err(Error::Embedding(format!(
                    "model returned {} embeddings for {} inputs",
                    batch.len(),
                    chunk.len()
                )));
            }
            embeddings.extend(batch);
        }

        if let Some(first) = embeddings.first() {
            let dims = first.len();
            if embeddings.iter().any(|e| e.len() != dims) {
                return Err(Error::Embedding("embeddings have inconsistent dimensions".to_string()));
            }
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingModel for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    #[derive(Debug)]
    struct ShortModel;

    #[async_trait]
    impl EmbeddingModel for ShortModel {
        fn name(&self) -> &str {
            "short"
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0]])
        }
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let model = Arc::new(CountingModel::default());
        let generator = EmbeddingGenerator::new(model.clone()).with_batch_size(2);
        let texts: Vec<String> = ["a", "bb", "ccc", "dddd", "eeeee"].iter().map(|s| s.to_string()).collect();

        let embeddings = generator.generate_embeddings(&texts).await.unwrap();
        assert_eq!(embeddings, vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]]);
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_an_error() {
        let generator = EmbeddingGenerator::new(Arc::new(ShortModel));
        let texts = vec!["one".to_string(), "two".to_string()];
        let result = generator.generate_embeddings(&texts).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let model = Arc::new(CountingModel::default());
        let generator = EmbeddingGenerator::new(model.clone());
        assert!(generator.generate_embeddings(&[]).await.unwrap().is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
