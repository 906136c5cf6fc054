use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use nd_core::{ArticleRecord, Logger, RecordStorage, Result, RunArtifact, TextGenerator, ZeroShotClassifier};
use nd_inference::EmbeddingGenerator;

use crate::classify::{default_candidate_labels, Classifier};
use crate::dedup::{validate_threshold, Deduplicator, DEFAULT_THRESHOLD};
use crate::summarize::{SummarySettings, Summarizer};

/// The point a run reached. A run halts at the first stage that leaves no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingested,
    Deduplicated,
    Classified,
    Summarized,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingested => "ingested",
            Stage::Deduplicated => "deduplicated",
            Stage::Classified => "classified",
            Stage::Summarized => "summarized",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// `stage` produced an empty collection; nothing after it ran and nothing final was saved.
    Halted { stage: Stage },
    Completed {
        records: Vec<ArticleRecord>,
        location: String,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub dedup_threshold: f32,
    /// Maximum number of summarization requests; `None` is unlimited.
    pub summary_limit: Option<usize>,
    pub candidate_labels: Vec<String>,
    pub summary: SummarySettings,
    /// Save the ingested records before any stage runs.
    pub persist_raw: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dedup_threshold: DEFAULT_THRESHOLD,
            summary_limit: None,
            candidate_labels: default_candidate_labels(),
            summary: SummarySettings::default(),
            persist_raw: true,
        }
    }
}

/// Keeps the first record for every link, in order.
pub fn collapse_same_links(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.link.clone()))
        .collect()
}

pub struct Pipeline {
    deduplicator: Deduplicator,
    classifier: Classifier,
    summarizer: Summarizer,
    storage: Arc<dyn RecordStorage>,
    config: PipelineConfig,
    logger: Logger,
}

impl Pipeline {
    pub fn new(
        embeddings: EmbeddingGenerator,
        classifier: Arc<dyn ZeroShotClassifier>,
        generator: Option<Arc<dyn TextGenerator>>,
        storage: Arc<dyn RecordStorage>,
        config: PipelineConfig,
    ) -> Result<Self> {
        validate_threshold(config.dedup_threshold)?;
        Ok(Self {
            deduplicator: Deduplicator::new(embeddings),
            classifier: Classifier::new(classifier, config.candidate_labels.clone())?,
            summarizer: Summarizer::new(generator, config.summary.clone()),
            storage,
            config,
            logger: Logger::new().with_prefix("Pipeline:"),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs deduplication, classification and summarization over `ingested`
    /// and saves the result under `date`.
    ///
    /// Only an embedding or storage failure is an error. Empty intermediate
    /// results end the run with [`RunOutcome::Halted`].
    pub async fn run(&self, ingested: Vec<ArticleRecord>, date: NaiveDate) -> Result<RunOutcome> {
        self.logger.info(&format!("🚀 Starting run for {}", date));
        if ingested.is_empty() {
            return Ok(self.halt(Stage::Ingested));
        }
        self.logger.info(&format!("📥 {} articles ingested", ingested.len()));

        if self.config.persist_raw {
            let location = self.storage.save_records(RunArtifact::Raw, date, &ingested).await?;
            self.logger.info(&format!("💾 Raw snapshot saved to {}", location));
        }

        let before = ingested.len();
        let records = collapse_same_links(ingested);
        if records.len() < before {
            self.logger.info(&format!(
                "🔗 Dropped {} articles repeating an earlier link",
                before - records.len()
            ));
        }

        let records = self
            .deduplicator
            .deduplicate(records, self.config.dedup_threshold)
            .await?;
        if records.is_empty() {
            return Ok(self.halt(Stage::Deduplicated));
        }
        self.logger.info(&format!("🧹 {} unique articles after deduplication", records.len()));

        let records = self.classifier.classify(records).await;
        if records.is_empty() {
            return Ok(self.halt(Stage::Classified));
        }
        self.logger.info(&format!("🏷️ Classified {} articles", records.len()));

        let records = self.summarizer.summarize(records, self.config.summary_limit).await;
        if records.is_empty() {
            return Ok(self.halt(Stage::Summarized));
        }
        let published = records.iter().filter(|r| r.is_publishable()).count();
        self.logger.info(&format!("📝 {} of {} articles summarized", published, records.len()));

        let location = self.storage.save_records(RunArtifact::Final, date, &records).await?;
        self.logger.info(&format!("✅ Final results saved to {} ({})", location, Stage::Persisted));
        Ok(RunOutcome::Completed { records, location })
    }

    fn halt(&self, stage: Stage) -> RunOutcome {
        self.logger.warn(&format!("⏹️ No articles left after the {} stage; stopping", stage));
        RunOutcome::Halted { stage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nd_core::{Classification, EmbeddingModel, Error, GenerationRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Counting {
        embeds: AtomicUsize,
        classifies: AtomicUsize,
        generations: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingModel for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.embeds.fetch_add(1, Ordering::SeqCst);
            Ok((0..texts.len())
                .map(|i| {
                    let mut v = vec![0.0; texts.len()];
                    v[i] = 1.0;
                    v
                })
                .collect())
        }
    }

    #[async_trait]
    impl ZeroShotClassifier for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn classify(&self, _text: &str, labels: &[String], _multi_label: bool) -> Result<Classification> {
            self.classifies.fetch_add(1, Ordering::SeqCst);
            Classification::new(labels.to_vec(), vec![0.5; labels.len()])
        }
    }

    #[async_trait]
    impl TextGenerator for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            self.generations.fetch_add(1, Ordering::SeqCst);
            Ok("A short summary.".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingStorage {
        saved: Mutex<Vec<(RunArtifact, usize)>>,
    }

    #[async_trait]
    impl RecordStorage for RecordingStorage {
        async fn save_records(
            &self,
            artifact: RunArtifact,
            date: NaiveDate,
            records: &[ArticleRecord],
        ) -> Result<String> {
            self.saved.lock().unwrap().push((artifact, records.len()));
            Ok(format!("{}/{}", artifact, date))
        }

        async fn load_records(&self, _artifact: RunArtifact, _date: NaiveDate) -> Result<Vec<ArticleRecord>> {
            Err(Error::Storage("not supported".to_string()))
        }
    }

    fn pipeline(models: Arc<Counting>, storage: Arc<RecordingStorage>) -> Pipeline {
        let config = PipelineConfig {
            summary: SummarySettings {
                request_delay: Duration::ZERO,
                ..SummarySettings::default()
            },
            ..PipelineConfig::default()
        };
        Pipeline::new(
            EmbeddingGenerator::new(models.clone()),
            models.clone(),
            Some(models),
            storage,
            config,
        )
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_collapse_same_links_keeps_first() {
        let records = vec![
            ArticleRecord::new("a", "first", "https://x.com/1"),
            ArticleRecord::new("b", "second", "https://x.com/1"),
            ArticleRecord::new("a", "third", "https://x.com/2"),
        ];
        let titles: Vec<String> = collapse_same_links(records).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let models = Arc::new(Counting::default());
        let result = Pipeline::new(
            EmbeddingGenerator::new(models.clone()),
            models.clone(),
            None,
            Arc::new(RecordingStorage::default()),
            PipelineConfig {
                dedup_threshold: 2.0,
                ..PipelineConfig::default()
            },
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_ingestion_halts_before_anything() {
        let models = Arc::new(Counting::default());
        let storage = Arc::new(RecordingStorage::default());
        let outcome = pipeline(models.clone(), storage.clone()).run(Vec::new(), date()).await.unwrap();

        assert_eq!(outcome, RunOutcome::Halted { stage: Stage::Ingested });
        assert_eq!(models.embeds.load(Ordering::SeqCst), 0);
        assert!(storage.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completed_run_saves_raw_and_final() {
        let models = Arc::new(Counting::default());
        let storage = Arc::new(RecordingStorage::default());
        let records = vec![
            ArticleRecord::new("a", "A headline about robots", "https://x.com/1"),
            ArticleRecord::new("b", "A headline about robots", "https://x.com/1"),
            ArticleRecord::new("a", "Another story on chips", "https://x.com/2"),
        ];

        let outcome = pipeline(models.clone(), storage.clone()).run(records, date()).await.unwrap();
        let RunOutcome::Completed { records, location } = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(location, "final/2024-05-01");
        assert!(records.iter().all(|r| r.classification.is_some() && r.is_publishable()));
        assert_eq!(
            *storage.saved.lock().unwrap(),
            vec![(RunArtifact::Raw, 3), (RunArtifact::Final, 2)]
        );
        assert_eq!(models.classifies.load(Ordering::SeqCst), 2);
        assert_eq!(models.generations.load(Ordering::SeqCst), 2);
    }
}
