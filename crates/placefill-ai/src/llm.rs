//! Generative text service.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[cfg(feature = "openai")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no text output")]
    EmptyOutput,
}

/// Prompt in, text out. The text may be JSON, fenced JSON, or prose.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[cfg(feature = "openai")]
pub use openai::{DEFAULT_MODEL, OpenAiClient};

#[cfg(feature = "openai")]
mod openai {
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use tracing::debug;

    use super::{LlmError, TextGenerator};

    const OPENAI_API: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct ResponsesBody {
        output_text: Option<String>,
        output: Vec<OutputItem>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct OutputItem {
        content: Vec<ContentPart>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct ContentPart {
        #[serde(rename = "type")]
        kind: String,
        text: Option<String>,
    }

    /// Client for the OpenAI Responses API.
    pub struct OpenAiClient {
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
    }

    impl OpenAiClient {
        pub fn new(api_key: String, model: String) -> Self {
            Self::with_base_url(OPENAI_API.to_string(), api_key, model)
        }

        pub fn with_base_url(base_url: String, api_key: String, model: String) -> Self {
            Self {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
                model,
            }
        }

        pub fn model(&self) -> &str {
            &self.model
        }
    }

    #[async_trait]
    impl TextGenerator for OpenAiClient {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let url = format!("{}/responses", self.base_url);
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&json!({ "model": self.model, "input": prompt }))
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(LlmError::Server {
                    status: status.as_u16(),
                    body,
                });
            }

            let text = extract_output_text(&resp.text().await?)?;
            debug!(model = %self.model, len = text.len(), "generation complete");
            Ok(text)
        }
    }

    /// Pull the text output out of a Responses API body.
    pub(super) fn extract_output_text(body: &str) -> Result<String, LlmError> {
        let parsed: ResponsesBody = serde_json::from_str(body)?;
        if let Some(text) = parsed.output_text.filter(|t| !t.trim().is_empty()) {
            return Ok(text.trim().to_string());
        }
        let text: String = parsed
            .output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyOutput);
        }
        Ok(text.to_string())
    }

}
