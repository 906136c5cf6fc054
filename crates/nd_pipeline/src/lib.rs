//! The processing half of a digest run: near-duplicate removal, topic
//! classification and popular-science summarization, sequenced by [`Pipeline`].

pub mod classify;
pub mod content;
pub mod dedup;
pub mod orchestrator;
pub mod prompt;
pub mod summarize;

pub use classify::{default_candidate_labels, Classifier, DEFAULT_CANDIDATE_LABELS};
pub use content::select_content;
pub use dedup::{Deduplicator, DEFAULT_THRESHOLD};
pub use orchestrator::{collapse_same_links, Pipeline, PipelineConfig, RunOutcome, Stage};
pub use summarize::{SummarySettings, Summarizer};

pub mod prelude {
    pub use super::{Pipeline, PipelineConfig, RunOutcome, Stage, SummarySettings};
    pub use nd_core::{ArticleRecord, Error, Result};
}
