pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use logging::{init_logging, Logger};
pub use models::{EmbeddingModel, GenerationRequest, TextGenerator, ZeroShotClassifier};
pub use storage::{RecordStorage, RunArtifact};
pub use types::{
    ArticleRecord, Classification, SkipReason, SummaryOutcome, ERROR_LABEL, UNCLASSIFIED_LABEL,
    UNKNOWN_DATE,
};

/// Cosine similarity of two vectors. Mismatched lengths or a zero vector give 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Returns at most the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub mod prelude {
    pub use super::{
        ArticleRecord, Classification, Error, Result, SkipReason, SummaryOutcome,
    };
}
