use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nd_core::{Classification, EmbeddingModel, Error, Result, ZeroShotClassifier};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "facebook/bart-large-mnli";

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
    options: serde_json::Value,
}

#[derive(Deserialize)]
struct ZeroShotOutput {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// The hosted pipeline answers either with a single object or a one-element list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Single(ZeroShotOutput),
    Many(Vec<ZeroShotOutput>),
}

impl ZeroShotResponse {
    fn into_classification(self) -> Result<Classification> {
        let output = match self {
            ZeroShotResponse::Single(output) => output,
            ZeroShotResponse::Many(outputs) => outputs
                .into_iter()
                .next()
                .ok_or_else(|| Error::Classification("empty zero-shot response".to_string()))?,
        };
        Classification::new(output.labels, output.scores)
    }
}

/// Shared plumbing for the Hugging Face inference API.
struct HfClient {
    client: Client,
    token: Option<String>,
    base_url: String,
}

impl HfClient {
    fn new(token: Option<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            token: token.filter(|t| !t.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let mut request = self.client.post(format!("{}/{}", self.base_url, path)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}

impl fmt::Debug for HfClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HfClient")
            .field("token", &self.token.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Sentence embeddings through the hosted feature-extraction pipeline.
#[derive(Debug)]
pub struct HuggingFaceEmbedder {
    http: HfClient,
    model: String,
}

impl HuggingFaceEmbedder {
    pub fn new(token: Option<String>, base_url: &str, model: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HfClient::new(token, base_url, timeout)?,
            model,
        })
    }
}

#[async_trait]
impl EmbeddingModel for HuggingFaceEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.model, count = texts.len(), "Hugging Face embedding request");

        let body = json!({ "inputs": texts, "options": { "wait_for_model": true } });
        let response = self
            .http
            .post(&format!("pipeline/feature-extraction/{}", self.model), &body)
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "feature extraction failed ({}): {}",
                status, text
            )));
        }

        Ok(response.json::<Vec<Vec<f32>>>().await?)
    }
}

/// Zero-shot classification through a hosted NLI model.
#[derive(Debug)]
pub struct HuggingFaceClassifier {
    http: HfClient,
    model: String,
}

impl HuggingFaceClassifier {
    pub fn new(token: Option<String>, base_url: &str, model: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HfClient::new(token, base_url, timeout)?,
            model,
        })
    }
}

#[async_trait]
impl ZeroShotClassifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        multi_label: bool,
    ) -> Result<Classification> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels,
                multi_label,
            },
            options: json!({ "wait_for_model": true }),
        };
        let response = self.http.post(&format!("models/{}", self.model), &body).await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Classification(format!(
                "zero-shot request failed ({}): {}",
                status, text
            )));
        }

        response.json::<ZeroShotResponse>().await?.into_classification()
    }
}
