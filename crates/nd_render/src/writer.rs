use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use nd_core::{Error, Result};
use tracing::info;

pub const DEFAULT_SITE_DIR: &str = "newsletter_site/content/newsletter";

/// Saves rendered newsletters as `<site_dir>/<YYYY-MM-DD>.md`.
#[derive(Debug, Clone)]
pub struct NewsletterWriter {
    site_dir: PathBuf,
}

impl NewsletterWriter {
    pub fn new(site_dir: impl Into<PathBuf>) -> Self {
        Self {
            site_dir: site_dir.into(),
        }
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.site_dir.join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    pub async fn save(&self, markdown: &str, date: NaiveDate) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.site_dir).await.map_err(|e| {
            Error::Storage(format!("Failed to create {}: {}", self.site_dir.display(), e))
        })?;
        let path = self.path_for(date);
        tokio::fs::write(&path, markdown)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
        info!("📰 Newsletter saved to {}", path.display());
        Ok(path)
    }
}

impl Default for NewsletterWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = NewsletterWriter::new(dir.path().join("content/newsletter"));
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let path = writer.save("# Hello\n", date).await.unwrap();
        assert!(path.ends_with("content/newsletter/2024-05-01.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Hello\n");
    }
}
