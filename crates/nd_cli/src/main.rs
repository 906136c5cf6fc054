use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use nd_core::{ArticleRecord, RecordStorage, RunArtifact};
use nd_inference::{create_classifier, create_embedder, create_generator, Backend, EmbeddingGenerator};
use nd_ingest::{IngestManager, IngestOptions};
use nd_pipeline::{Pipeline, RunOutcome};
use nd_render::{render_newsletter, Locale, NewsletterWriter};
use tracing::info;

mod config;
mod duration;

use config::AppConfig;
use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily AI news digest: ingest, deduplicate, classify, summarize, render", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Where run snapshots are kept: file or memory
    #[arg(long, global = true, default_value = "file")]
    storage: String,
    /// Overrides ND_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Overrides ND_SITE_DIR
    #[arg(long, global = true)]
    site_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest, process and render today's digest
    Run {
        #[command(flatten)]
        ingest: IngestArgs,
        #[command(flatten)]
        processing: ProcessingArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch articles and save the raw snapshot only
    Ingest {
        #[command(flatten)]
        ingest: IngestArgs,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run the processing stages over a saved record file
    Process {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        processing: ProcessingArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render the saved final snapshot for a date
    Render {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the default sources
    Sources {
        #[arg(long, default_value_t = 1)]
        max_pages: usize,
    },
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// Skip fetching article pages for full text
    #[arg(long)]
    no_full_text: bool,
    /// Listing pages to walk per listing source
    #[arg(long, default_value_t = 1)]
    max_pages: usize,
}

#[derive(Args, Debug)]
struct ProcessingArgs {
    /// Cosine similarity at or above which a later article is a duplicate
    #[arg(long)]
    threshold: Option<f32>,
    /// Maximum number of articles sent for summarization
    #[arg(long)]
    limit: Option<usize>,
    /// Pause between summarization requests (e.g. 1s, 500ms)
    #[arg(long, default_value = "1s")]
    delay: HumanDuration,
    /// Use deterministic local models instead of the hosted APIs
    #[arg(long)]
    offline: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Run date, defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Newsletter language: en or zh-tw
    #[arg(long, default_value = "en")]
    locale: Locale,
}

fn run_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn ingest_manager(args: &IngestArgs) -> anyhow::Result<IngestManager> {
    let options = IngestOptions {
        fetch_full_text: !args.no_full_text,
        ..IngestOptions::default()
    };
    Ok(IngestManager::with_default_sources(args.max_pages, options)?)
}

fn build_pipeline(
    config: &AppConfig,
    args: &ProcessingArgs,
    storage: Arc<dyn RecordStorage>,
    persist_raw: bool,
) -> anyhow::Result<Pipeline> {
    let mut config = config.clone();
    if let Some(threshold) = args.threshold {
        config.dedup_threshold = threshold;
    }
    if let Some(limit) = args.limit {
        config.summary_limit = Some(limit);
    }

    let backend = if args.offline { Backend::Offline } else { Backend::Remote };
    let inference = config.inference_config(backend);
    let embedder = create_embedder(&inference)?;
    let classifier = create_classifier(&inference)?;
    let generator = create_generator(&inference)?;

    let pipeline = Pipeline::new(
        EmbeddingGenerator::new(embedder),
        classifier,
        generator,
        storage,
        config.pipeline_config(args.delay.0, persist_raw),
    )?;
    Ok(pipeline)
}

async fn render(config: &AppConfig, records: &[ArticleRecord], output: &OutputArgs, date: NaiveDate) -> anyhow::Result<()> {
    let markdown = render_newsletter(records, date, output.locale);
    NewsletterWriter::new(&config.site_dir).save(&markdown, date).await?;
    Ok(())
}

async fn process(
    config: &AppConfig,
    pipeline: &Pipeline,
    records: Vec<ArticleRecord>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let date = run_date(output.date);
    match pipeline.run(records, date).await? {
        RunOutcome::Completed { records, location } => {
            info!("✨ {} articles saved to {}", records.len(), location);
            render(config, &records, output, date).await
        }
        RunOutcome::Halted { stage } => {
            info!("⏹️ Run stopped after the {} stage; nothing to render", stage);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    nd_core::init_logging(cli.verbose);

    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.site_dir {
        config.site_dir = dir;
    }
    tracing::debug!("Configuration: {:?}", config);
    let storage = nd_storage::create_storage(&cli.storage, &config.data_dir)?;

    match cli.command {
        Commands::Run {
            ingest,
            processing,
            output,
        } => {
            let pipeline = build_pipeline(&config, &processing, storage, true)?;
            let records = ingest_manager(&ingest)?.ingest().await;
            process(&config, &pipeline, records, &output).await?;
        }
        Commands::Ingest { ingest, date } => {
            let records = ingest_manager(&ingest)?.ingest().await;
            if records.is_empty() {
                info!("📭 No articles ingested; nothing saved");
                return Ok(());
            }
            let location = storage
                .save_records(RunArtifact::Raw, run_date(date), &records)
                .await?;
            info!("💾 Saved {} raw articles to {}", records.len(), location);
        }
        Commands::Process {
            input,
            processing,
            output,
        } => {
            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let records: Vec<ArticleRecord> =
                serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", input.display()))?;
            let pipeline = build_pipeline(&config, &processing, storage, false)?;
            process(&config, &pipeline, records, &output).await?;
        }
        Commands::Render { output } => {
            let date = run_date(output.date);
            let records = storage
                .load_records(RunArtifact::Final, date)
                .await
                .with_context(|| format!("loading the final snapshot for {}", date))?;
            render(&config, &records, &output, date).await?;
        }
        Commands::Sources { max_pages } => {
            for source in nd_ingest::default_sources(max_pages) {
                let meta = source.source_metadata();
                println!("{} {:<24} {:<8} {}", meta.kind.emoji(), meta.name, meta.kind, meta.url);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "nd", "run", "--threshold", "0.9", "--limit", "3", "--delay", "500ms", "--offline", "--no-full-text",
            "--locale", "zh-tw", "--date", "2024-05-01",
        ])
        .unwrap();
        let Commands::Run {
            ingest,
            processing,
            output,
        } = cli.command
        else {
            panic!("expected the run command");
        };
        assert!(ingest.no_full_text);
        assert_eq!(processing.threshold, Some(0.9));
        assert_eq!(processing.limit, Some(3));
        assert_eq!(processing.delay.0, std::time::Duration::from_millis(500));
        assert!(processing.offline);
        assert_eq!(output.locale, Locale::ZhTw);
        assert_eq!(output.date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_cli_rejects_bad_locale() {
        assert!(Cli::try_parse_from(["nd", "render", "--locale", "fr"]).is_err());
    }

    #[tokio::test]
    async fn test_offline_process_renders_newsletter() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            site_dir: dir.path().join("site"),
            ..AppConfig::from_lookup(|_| None).unwrap()
        };
        let processing = ProcessingArgs {
            threshold: None,
            limit: Some(1),
            delay: HumanDuration(std::time::Duration::ZERO),
            offline: true,
        };
        let storage = nd_storage::create_storage("memory", dir.path()).unwrap();
        let pipeline = build_pipeline(&config, &processing, storage, false).unwrap();
        let output = OutputArgs {
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            locale: Locale::En,
        };
        let records = vec![ArticleRecord::new("Lab", "Robots learn to fold laundry", "https://x.com/1")
            .with_feed_summary("A research team trained a robot arm to fold shirts. It succeeds most of the time.")];

        process(&config, &pipeline, records, &output).await.unwrap();
        let markdown = std::fs::read_to_string(dir.path().join("site/2024-05-01.md")).unwrap();
        assert!(markdown.contains("[Robots learn to fold laundry](https://x.com/1)"));
    }
}
