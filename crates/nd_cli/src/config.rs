use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use nd_core::{Error, Result};
use nd_inference::{Backend, InferenceConfig};
use nd_pipeline::{default_candidate_labels, PipelineConfig, SummarySettings, DEFAULT_THRESHOLD};

pub const DEFAULT_DATA_DIR: &str = "data";

/// Process-wide settings, read once from the environment (and `.env`).
#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub summary_max_tokens: u32,
    pub summary_temperature: f32,
    pub hf_api_token: Option<String>,
    pub embedding_model: String,
    pub classifier_model: String,
    pub dedup_threshold: f32,
    pub summary_limit: Option<usize>,
    pub candidate_labels: Vec<String>,
    pub data_dir: PathBuf,
    pub site_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("summary_temperature", &self.summary_temperature)
            .field("hf_api_token", &self.hf_api_token.as_ref().map(|_| "[REDACTED]"))
            .field("embedding_model", &self.embedding_model)
            .field("classifier_model", &self.classifier_model)
            .field("dedup_threshold", &self.dedup_threshold)
            .field("summary_limit", &self.summary_limit)
            .field("candidate_labels", &self.candidate_labels)
            .field("data_dir", &self.data_dir)
            .field("site_dir", &self.site_dir)
            .finish()
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| Error::Config(format!("{} has an invalid value '{}': {}", name, raw, e)))
        })
        .transpose()
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let inference = InferenceConfig::default();
        let summary = SummarySettings::default();

        let candidate_labels = match get("CANDIDATE_LABELS") {
            Some(raw) => {
                let labels: Vec<String> = raw
                    .split(';')
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                if labels.is_empty() {
                    return Err(Error::Config("CANDIDATE_LABELS contains no labels".to_string()));
                }
                labels
            }
            None => default_candidate_labels(),
        };

        let summary_limit = match get("SUMMARY_LIMIT").as_deref() {
            Some("none") | Some("unlimited") => None,
            _ => parse_var("SUMMARY_LIMIT", get("SUMMARY_LIMIT"))?,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(summary.model),
            openai_base_url: get("OPENAI_BASE_URL"),
            summary_max_tokens: parse_var("SUMMARY_MAX_TOKENS", get("SUMMARY_MAX_TOKENS"))?
                .unwrap_or(summary.max_tokens),
            summary_temperature: parse_var("SUMMARY_TEMPERATURE", get("SUMMARY_TEMPERATURE"))?
                .unwrap_or(summary.temperature),
            hf_api_token: get("HF_API_TOKEN"),
            embedding_model: get("EMBEDDING_MODEL").unwrap_or(inference.embedding_model),
            classifier_model: get("CLASSIFIER_MODEL").unwrap_or(inference.classifier_model),
            dedup_threshold: parse_var("DEDUP_THRESHOLD", get("DEDUP_THRESHOLD"))?.unwrap_or(DEFAULT_THRESHOLD),
            summary_limit,
            candidate_labels,
            data_dir: get("ND_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            site_dir: get("ND_SITE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(nd_render::DEFAULT_SITE_DIR)),
        })
    }

    pub fn inference_config(&self, backend: Backend) -> InferenceConfig {
        let defaults = InferenceConfig::default();
        InferenceConfig {
            backend,
            openai_api_key: self.openai_api_key.clone(),
            openai_base_url: self.openai_base_url.clone().unwrap_or(defaults.openai_base_url),
            hf_api_token: self.hf_api_token.clone(),
            embedding_model: self.embedding_model.clone(),
            classifier_model: self.classifier_model.clone(),
            ..defaults
        }
    }

    pub fn pipeline_config(&self, request_delay: Duration, persist_raw: bool) -> PipelineConfig {
        PipelineConfig {
            dedup_threshold: self.dedup_threshold,
            summary_limit: self.summary_limit,
            candidate_labels: self.candidate_labels.clone(),
            summary: SummarySettings {
                model: self.openai_model.clone(),
                max_tokens: self.summary_max_tokens,
                temperature: self.summary_temperature,
                request_delay,
            },
            persist_raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.summary_max_tokens, 1024);
        assert_eq!(config.dedup_threshold, 0.85);
        assert_eq!(config.summary_limit, None);
        assert_eq!(config.candidate_labels.len(), 6);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.site_dir, PathBuf::from("newsletter_site/content/newsletter"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DEDUP_THRESHOLD", "0.9"),
            ("SUMMARY_LIMIT", "5"),
            ("CANDIDATE_LABELS", "Robotics; Policy ;"),
            ("HF_API_TOKEN", "   "),
        ])
        .unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.dedup_threshold, 0.9);
        assert_eq!(config.summary_limit, Some(5));
        assert_eq!(config.candidate_labels, vec!["Robotics", "Policy"]);
        assert_eq!(config.hf_api_token, None);
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        assert!(matches!(config(&[("SUMMARY_LIMIT", "five")]), Err(Error::Config(_))));
        assert!(matches!(config(&[("DEDUP_THRESHOLD", "high")]), Err(Error::Config(_))));
        assert!(matches!(config(&[("CANDIDATE_LABELS", " ; ")]), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_pipeline_config_carries_settings() {
        let config = config(&[("SUMMARY_LIMIT", "2"), ("OPENAI_MODEL", "gpt-4o-mini")]).unwrap();
        let pipeline = config.pipeline_config(Duration::from_millis(250), false);
        assert_eq!(pipeline.summary_limit, Some(2));
        assert_eq!(pipeline.summary.model, "gpt-4o-mini");
        assert_eq!(pipeline.summary.request_delay, Duration::from_millis(250));
        assert!(!pipeline.persist_raw);
    }
}
