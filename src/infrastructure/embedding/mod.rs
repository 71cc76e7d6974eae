//! HTTP embedding provider (OpenAI-compatible embeddings endpoint)

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, EmbeddingProvider};

const PROVIDER_NAME: &str = "embedding";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Embedding provider speaking the OpenAI `/v1/embeddings` wire format.
#[derive(Debug)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(self.embeddings_url())
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

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| DomainError::embedding(format!("failed to parse response: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::embedding("no embedding returned"))?;

        if embedding.len() != self.dimensions {
            return Err(DomainError::embedding(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
