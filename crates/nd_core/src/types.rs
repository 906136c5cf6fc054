use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Published date placeholder used when a source gives no usable timestamp.
pub const UNKNOWN_DATE: &str = "N/A";

pub const UNCLASSIFIED_LABEL: &str = "Unclassified";
pub const ERROR_LABEL: &str = "Error";

const FAILURE_PREFIX: &str = "Error:";

fn unknown_date() -> String {
    UNKNOWN_DATE.to_string()
}

/// A single news article as it moves through ingestion, processing and rendering.
///
/// The three body fields are kept apart because the summarizer prefers them in a
/// different order than the embedding and classification inputs do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub source: String,
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default = "unknown_date")]
    pub published_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, rename = "summary_from_feed", skip_serializing_if = "Option::is_none")]
    pub feed_summary: Option<String>,
    #[serde(default, rename = "summary_from_list", skip_serializing_if = "Option::is_none")]
    pub listing_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popular_summary: Option<SummaryOutcome>,
}

impl ArticleRecord {
    pub fn new(source: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            link: link.into(),
            published_date: unknown_date(),
            full_text: None,
            feed_summary: None,
            listing_summary: None,
            classification: None,
            popular_summary: None,
        }
    }

    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = date.into();
        self
    }

    pub fn with_full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = Some(text.into());
        self
    }

    pub fn with_feed_summary(mut self, summary: impl Into<String>) -> Self {
        self.feed_summary = Some(summary.into());
        self
    }

    pub fn with_listing_summary(mut self, summary: impl Into<String>) -> Self {
        self.listing_summary = Some(summary.into());
        self
    }

    /// Best available body text: full text, then feed summary, then listing blurb.
    /// Blank fields are skipped; returns an empty string when nothing is present.
    pub fn content_text(&self) -> &str {
        [&self.full_text, &self.feed_summary, &self.listing_summary]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|text| !text.trim().is_empty())
            .unwrap_or("")
    }

    /// Whether the renderer may publish this record.
    pub fn is_publishable(&self) -> bool {
        self.popular_summary
            .as_ref()
            .map(SummaryOutcome::is_publishable)
            .unwrap_or(false)
    }
}

/// Zero-shot topic scores, sorted descending and index-aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl Classification {
    /// Builds a classification from raw service output, sorting by score.
    pub fn new(labels: Vec<String>, scores: Vec<f32>) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(Error::Classification(format!(
                "got {} labels but {} scores",
                labels.len(),
                scores.len()
            )));
        }
        if labels.is_empty() {
            return Err(Error::Classification("empty classification result".to_string()));
        }
        Ok(Self::from_pairs(labels.into_iter().zip(scores).collect()))
    }

    pub fn from_pairs(mut pairs: Vec<(String, f32)>) -> Self {
        // NaN scores sink to the end
        pairs.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
        });
        let (labels, scores) = pairs.into_iter().unzip();
        Self { labels, scores }
    }

    pub fn unclassified() -> Self {
        Self::single(UNCLASSIFIED_LABEL)
    }

    pub fn error() -> Self {
        Self::single(ERROR_LABEL)
    }

    fn single(label: &str) -> Self {
        Self {
            labels: vec![label.to_string()],
            scores: vec![0.0],
        }
    }

    pub fn top_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn top_score(&self) -> Option<f32> {
        self.scores.first().copied()
    }

    pub fn is_error(&self) -> bool {
        self.top_label() == Some(ERROR_LABEL)
    }

    pub fn is_sorted(&self) -> bool {
        self.labels.len() == self.scores.len() && self.scores.windows(2).all(|w| w[0] >= w[1])
    }
}

/// Why the summarizer deliberately did not call the generative API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    InsufficientContent,
    MissingApiKey,
    LimitReached,
}

impl SkipReason {
    pub const ALL: [SkipReason; 3] = [
        SkipReason::InsufficientContent,
        SkipReason::MissingApiKey,
        SkipReason::LimitReached,
    ];

    pub fn sentinel(&self) -> &'static str {
        match self {
            SkipReason::InsufficientContent => "Content insufficient for summarization.",
            SkipReason::MissingApiKey => "Summarization skipped: API key not configured.",
            SkipReason::LimitReached => "Summarization skipped: processing limit reached.",
        }
    }
}

/// Result of summarizing one article.
///
/// On disk this is a plain string: the summary itself, one of the skip
/// sentinels, or a failure message prefixed with `Error:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SummaryOutcome {
    Summary(String),
    Skipped(SkipReason),
    Failed(String),
}

impl SummaryOutcome {
    /// A summary is published only when it is non-blank and carries no
    /// `Error:` marker anywhere in its text.
    pub fn is_publishable(&self) -> bool {
        matches!(
            self,
            SummaryOutcome::Summary(text) if !text.trim().is_empty() && !text.contains(FAILURE_PREFIX)
        )
    }

    pub fn as_summary(&self) -> Option<&str> {
        match self {
            SummaryOutcome::Summary(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SummaryOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SummaryOutcome::Failed(_))
    }
}

impl fmt::Display for SummaryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryOutcome::Summary(text) => f.write_str(text),
            SummaryOutcome::Skipped(reason) => f.write_str(reason.sentinel()),
            SummaryOutcome::Failed(reason) => write!(f, "{} {}", FAILURE_PREFIX, reason),
        }
    }
}

impl From<String> for SummaryOutcome {
    fn from(value: String) -> Self {
        if let Some(reason) = SkipReason::ALL.iter().find(|r| r.sentinel() == value) {
            return SummaryOutcome::Skipped(*reason);
        }
        match value.strip_prefix(FAILURE_PREFIX) {
            Some(reason) => SummaryOutcome::Failed(reason.trim_start().to_string()),
            None => SummaryOutcome::Summary(value),
        }
    }
}

impl From<SummaryOutcome> for String {
    fn from(value: SummaryOutcome) -> Self {
        value.to_string()
    }
}
