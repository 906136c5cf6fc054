use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use nd_core::{ArticleRecord, Error, RecordStorage, Result, RunArtifact};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

/// Writes each snapshot as a pretty-printed JSON array:
/// `<root>/raw/<date>_raw_ingested.json` and `<root>/processed/<date>_final_ai_news.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, artifact: RunArtifact, date: NaiveDate) -> PathBuf {
        let date = date.format("%Y-%m-%d");
        match artifact {
            RunArtifact::Raw => self.root.join("raw").join(format!("{}_raw_ingested.json", date)),
            RunArtifact::Final => self
                .root
                .join("processed")
                .join(format!("{}_final_ai_news.json", date)),
        }
    }
}

/// Serializes with a four-space indent.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[async_trait]
impl RecordStorage for JsonFileStorage {
    async fn save_records(
        &self,
        artifact: RunArtifact,
        date: NaiveDate,
        records: &[ArticleRecord],
    ) -> Result<String> {
        let path = self.path_for(artifact, date);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Storage(format!("Failed to create directory {}: {}", parent.display(), e))
            })?;
        }

        let json = to_pretty_json(records)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(path.display().to_string())
    }

    async fn load_records(&self, artifact: RunArtifact, date: NaiveDate) -> Result<Vec<ArticleRecord>> {
        let path = self.path_for(artifact, date);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{Classification, SkipReason, SummaryOutcome};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_artifact_paths() {
        let storage = JsonFileStorage::new("data");
        assert_eq!(
            storage.path_for(RunArtifact::Raw, date()),
            PathBuf::from("data/raw/2024-05-01_raw_ingested.json")
        );
        assert_eq!(
            storage.path_for(RunArtifact::Final, date()),
            PathBuf::from("data/processed/2024-05-01_final_ai_news.json")
        );
    }

    #[tokio::test]
    async fn test_save_creates_directories_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        let mut record = ArticleRecord::new("MIT", "研究突破", "https://x.com/1")
            .with_published_date("2024-05-01 08:00:00")
            .with_feed_summary("Short blurb.");
        record.classification = Some(Classification::unclassified());
        record.popular_summary = Some(SummaryOutcome::Skipped(SkipReason::LimitReached));

        let location = storage
            .save_records(RunArtifact::Final, date(), &[record.clone()])
            .await
            .unwrap();
        assert!(location.ends_with("2024-05-01_final_ai_news.json"));

        let text = std::fs::read_to_string(&location).unwrap();
        assert!(text.contains("\n    {\n        \"source\": \"MIT\""));
        assert!(text.contains("研究突破"));
        assert!(text.contains("\"summary_from_feed\": \"Short blurb.\""));
        assert!(text.contains("\"popular_summary\": \"Summarization skipped: processing limit reached.\""));

        let loaded = storage.load_records(RunArtifact::Final, date()).await.unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        let result = storage.load_records(RunArtifact::Raw, date()).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
