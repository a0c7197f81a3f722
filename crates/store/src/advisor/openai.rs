use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use stockline_engines::coordinator::DEFAULT_BUDGET;
use stockline_engines::{extract_json_object, Advisor, AdvisorError, AdvisorPrompt};

const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions client for the OpenAI API.
///
/// Configured from the environment:
/// - `OPENAI_API_KEY` (absent or empty means no advisor)
/// - `OPENAI_MODEL` (default `gpt-4.1-mini`)
/// - `OPENAI_BASE_URL` (default `https://api.openai.com/v1`)
pub struct OpenAiAdvisor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiAdvisor {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    /// Build an advisor from the environment, or `None` when no key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }

        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Some(Self::new(api_key, model, base_url))
    }
}

/// Per-call advisor budget, from `STOCKLINE_ADVISOR_TIMEOUT_SECS`.
pub fn advisor_budget_from_env() -> Duration {
    std::env::var("STOCKLINE_ADVISOR_TIMEOUT_SECS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_BUDGET)
}

#[async_trait]
impl Advisor for OpenAiAdvisor {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &AdvisorPrompt) -> Result<JsonValue, AdvisorError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisorError::Timeout
                } else {
                    AdvisorError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Unavailable(format!(
                "chat completion returned {status}"
            )));
        }

        let payload: JsonValue = response
            .json()
            .await
            .map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AdvisorError::Malformed("completion carries no message content".to_string())
            })?;

        debug!(model = %self.model, bytes = content.len(), "advisor completion received");

        extract_json_object(content).ok_or_else(|| {
            AdvisorError::Malformed("completion contains no JSON object".to_string())
        })
    }
}
