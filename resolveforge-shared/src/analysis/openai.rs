/// OpenAI Responses API client
///
/// Sends the complaint prompt to `POST {base_url}/responses` and parses the
/// reply into an [`Analysis`]. Transport errors and 5xx responses are retried
/// with exponential backoff; anything else fails immediately.
///
/// # Example
///
/// ```no_run
/// use resolveforge_shared::analysis::{Analyser, OpenAiAnalyser, OpenAiConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let analyser = OpenAiAnalyser::new(OpenAiConfig::new("sk-..."))?;
/// let analysis = analyser.analyse("My parcel never arrived and the seller ignores me.").await?;
/// println!("{}: {}", analysis.issue_type, analysis.summary);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::prompt::{build_prompt, parse_analysis};
use super::{Analyser, Analysis, AnalysisError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Configuration for [`OpenAiAnalyser`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,

    /// API root, without a trailing slash
    pub base_url: String,

    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts after the first failure
    pub max_retries: u32,

    /// Delay before the first retry; doubled for each further retry
    pub retry_backoff: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: String,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output_text: Option<String>,

    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<ContentText>,
}

/// Text appears either as a plain string or as `{"value": "..."}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentText {
    Plain(String),
    Wrapped { value: String },
}

impl ResponsesReply {
    fn into_text(self) -> Option<String> {
        if let Some(text) = self.output_text.filter(|t| !t.trim().is_empty()) {
            return Some(text);
        }

        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter_map(|part| part.text)
            .map(|text| match text {
                ContentText::Plain(value) | ContentText::Wrapped { value } => value,
            })
            .find(|text| !text.trim().is_empty())
    }
}

/// [`Analyser`] backed by the OpenAI Responses API
#[derive(Debug, Clone)]
pub struct OpenAiAnalyser {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiAnalyser {
    pub fn new(mut config: OpenAiConfig) -> Result<Self, AnalysisError> {
        if config.api_key.trim().is_empty() {
            return Err(AnalysisError::Http("OpenAI API key is not set".to_string()));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Fetches the model's raw text reply, retrying transient failures
    async fn complete(&self, prompt: String) -> Result<String, AnalysisError> {
        let mut attempt: u32 = 0;

        loop {
            match self.try_complete(&prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.config.retry_backoff, attempt);
                    tracing::warn!(
                        model = %self.config.model,
                        error = %e,
                        "OpenAI request failed (attempt {}/{}), retrying in {:?}",
                        attempt,
                        self.config.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = ResponsesRequest {
            model: &self.config.model,
            input: prompt.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/responses", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Http(e.to_string()))?;

        tracing::debug!(model = %self.config.model, bytes = body.len(), "OpenAI response received");

        let reply: ResponsesReply = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Unrecognised OpenAI response body");
            AnalysisError::EmptyResponse
        })?;

        reply.into_text().ok_or(AnalysisError::EmptyResponse)
    }
}

#[async_trait]
impl Analyser for OpenAiAnalyser {
    async fn analyse(&self, complaint: &str) -> Result<Analysis, AnalysisError> {
        let raw = self.complete(build_prompt(complaint)).await?;

        parse_analysis(&raw).map_err(|e| {
            if let AnalysisError::InvalidJson(_) = e {
                tracing::error!(model = %self.config.model, raw = %raw, "Failed to parse analysis JSON");
            }
            e
        })
    }
}

/// Exponential backoff for retry `attempt` (1-based), saturating on overflow
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
