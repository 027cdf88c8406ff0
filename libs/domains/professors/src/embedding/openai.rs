use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EmbeddingProvider;
use crate::config::OpenAIConfig;
use crate::error::{ChatError, ChatResult, UpstreamService};
use crate::models::{EmbeddingModel, EmbeddingResult};

/// OpenAI embeddings provider
pub struct OpenAIEmbeddingProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIEmbeddingProvider {
    pub fn new(config: OpenAIConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

fn upstream(err: impl std::fmt::Display) -> ChatError {
    ChatError::upstream(UpstreamService::Embedding, err)
}

/// Pull the single vector out of an embeddings response.
fn into_result(response: EmbeddingResponse) -> ChatResult<EmbeddingResult> {
    let tokens_used = response.usage.map(|u| u.total_tokens).unwrap_or_default();

    let values = response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| upstream("No embedding returned"))?;

    Ok(EmbeddingResult {
        dimension: values.len() as u32,
        values,
        tokens_used,
    })
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, model: EmbeddingModel, text: &str) -> ChatResult<EmbeddingResult> {
        let request = EmbeddingRequest {
            model: model.model_name(),
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(upstream)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(upstream(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(upstream)?;
        let result = into_result(body)?;

        debug!(
            model = model.model_name(),
            dimension = result.dimension,
            tokens = result.tokens_used,
            "Query embedded"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = EmbeddingRequest {
            model: EmbeddingModel::TextEmbeddingAda002.model_name(),
            input: "Chemistry",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"model": "text-embedding-ada-002", "input": "Chemistry"})
        );
    }

    #[test]
    fn test_into_result_takes_first_vector() {
        let response: EmbeddingResponse = serde_json::from_value(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
            "model": "text-embedding-ada-002",
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }))
        .unwrap();

        let result = into_result(response).unwrap();
        assert_eq!(result.values, vec![0.1, 0.2, 0.3]);
        assert_eq!(result.dimension, 3);
        assert_eq!(result.tokens_used, 4);
    }

    #[test]
    fn test_into_result_rejects_empty_data() {
        let response: EmbeddingResponse = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(matches!(
            into_result(response),
            Err(ChatError::Upstream {
                service: UpstreamService::Embedding,
                ..
            })
        ));
    }

    #[test]
    fn test_provider_builds_from_config() {
        let provider = OpenAIEmbeddingProvider::new(OpenAIConfig::new("sk-test".to_string()));
        assert!(provider.is_ok());
    }
}
