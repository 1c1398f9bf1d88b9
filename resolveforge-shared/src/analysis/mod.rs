/// Complaint analysis
///
/// Turns a consumer's free-text complaint into an issue label, a plain
/// English summary of their likely UK rights, and a draft complaint letter.
///
/// - [`prompt`]: prompt construction and parsing of the model's JSON reply
/// - [`openai`]: [`OpenAiAnalyser`], the Responses API client
///
/// Callers depend on the [`Analyser`] trait so the HTTP layer can be tested
/// without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod openai;
pub mod prompt;

pub use openai::{OpenAiAnalyser, OpenAiConfig};
pub use prompt::{build_prompt, extract_json_block, parse_analysis};

/// Structured result of analysing a complaint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Short label, e.g. "Faulty goods"
    pub issue_type: String,

    /// 3-5 sentence rights summary
    pub summary: String,

    /// Draft letter with placeholders such as `[Retailer]`
    pub letter: String,
}

/// Error type for analysis
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Client construction or transport failure (connect, timeout, body read)
    #[error("language model request failed: {0}")]
    Http(String),

    /// Provider answered with a non-success status
    #[error("language model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Provider answered without any text
    #[error("no content returned from the language model")]
    EmptyResponse,

    /// Text could not be parsed into an [`Analysis`]
    #[error("language model returned invalid JSON: {0}")]
    InvalidJson(String),
}

impl AnalysisError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Http(_) => true,
            AnalysisError::Api { status, .. } => *status >= 500,
            AnalysisError::EmptyResponse | AnalysisError::InvalidJson(_) => false,
        }
    }
}

/// Produces an [`Analysis`] from complaint text
#[async_trait]
pub trait Analyser: Send + Sync {
    async fn analyse(&self, complaint: &str) -> Result<Analysis, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_uses_camel_case_keys() {
        let analysis = Analysis {
            issue_type: "Lost parcel".to_string(),
            summary: "The retailer is responsible until delivery.".to_string(),
            letter: "Dear [Retailer], ...".to_string(),
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["issueType"], "Lost parcel");
        assert!(json.get("issue_type").is_none());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(AnalysisError::Http("timed out".to_string()).is_retryable());
        assert!(AnalysisError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(!AnalysisError::Api { status: 401, body: String::new() }.is_retryable());
        assert!(!AnalysisError::EmptyResponse.is_retryable());
        assert!(!AnalysisError::InvalidJson("eof".to_string()).is_retryable());
    }
}
