//! HTTP generation provider (OpenAI-compatible chat completions endpoint)

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, GenerationProvider};

const PROVIDER_NAME: &str = "generation";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Generation provider speaking the OpenAI `/v1/chat/completions` wire
/// format. Deterministic settings (temperature 0) so repeated generations of
/// the same query produce cache-friendly answers.
#[derive(Debug)]
pub struct OpenAiGenerationProvider {
    client: reqwest::Client,
    auth_header: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiGenerationProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl GenerationProvider for OpenAiGenerationProvider {
    async fn complete(&self, query: &str) -> Result<String, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": query}],
            "temperature": 0,
        });

        let response = self
            .client
            .post(self.chat_completions_url())
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::unavailable(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DomainError::throttled(PROVIDER_NAME, "rate limit exceeded"));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::unavailable(
                PROVIDER_NAME,
                format!("status {}: {}", status, detail),
            ));
        }

        let parsed: ChatCompletionsResponse = response.json().await.map_err(|e| {
            DomainError::unavailable(PROVIDER_NAME, format!("failed to parse response: {}", e))
        })?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(answer)
    }
}
