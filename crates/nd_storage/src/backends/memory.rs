use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use nd_core::{ArticleRecord, Error, RecordStorage, Result, RunArtifact};
use tokio::sync::RwLock;

type Key = (RunArtifact, NaiveDate);

/// Keeps snapshots in process memory. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    snapshots: Arc<RwLock<HashMap<Key, Vec<ArticleRecord>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStorage for InMemoryStorage {
    async fn save_records(
        &self,
        artifact: RunArtifact,
        date: NaiveDate,
        records: &[ArticleRecord],
    ) -> Result<String> {
        self.snapshots
            .write()
            .await
            .insert((artifact, date), records.to_vec());
        Ok(format!("memory://{}/{}", artifact, date))
    }

    async fn load_records(&self, artifact: RunArtifact, date: NaiveDate) -> Result<Vec<ArticleRecord>> {
        self.snapshots
            .read()
            .await
            .get(&(artifact, date))
            .cloned()
            .ok_or_else(|| Error::Storage(format!("no {} snapshot for {}", artifact, date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_replaces_snapshot() {
        let storage = InMemoryStorage::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let first = vec![ArticleRecord::new("s", "one", "https://x.com/1")];
        let second = vec![
            ArticleRecord::new("s", "two", "https://x.com/2"),
            ArticleRecord::new("s", "three", "https://x.com/3"),
        ];

        storage.save_records(RunArtifact::Final, date, &first).await.unwrap();
        let location = storage.save_records(RunArtifact::Final, date, &second).await.unwrap();
        assert_eq!(location, "memory://final/2024-05-01");
        assert_eq!(storage.load_records(RunArtifact::Final, date).await.unwrap(), second);
        assert_eq!(storage.len().await, 1);
        assert!(storage.load_records(RunArtifact::Raw, date).await.is_err());
    }
}
