use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::ArticleRecord;
use crate::Result;

/// Which snapshot of a run a record list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunArtifact {
    /// Everything ingestion produced, before deduplication.
    Raw,
    /// The deduplicated, classified and summarized records.
    Final,
}

impl fmt::Display for RunArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunArtifact::Raw => f.write_str("raw"),
            RunArtifact::Final => f.write_str("final"),
        }
    }
}

#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Stores the records for one run date, replacing any previous snapshot.
    /// Returns a human-readable location of what was written.
    async fn save_records(
        &self,
        artifact: RunArtifact,
        date: NaiveDate,
        records: &[ArticleRecord],
    ) -> Result<String>;

    async fn load_records(&self, artifact: RunArtifact, date: NaiveDate) -> Result<Vec<ArticleRecord>>;
}
