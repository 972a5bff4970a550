//! HTTP-based embedder using an OpenAI-compatible embeddings endpoint

use super::Embedder;
use crate::config::EmbeddingServiceConfig;
use crate::error::{Result, SemuError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedder speaking the OpenAI-compatible `/v1/embeddings` contract
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SemuError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingServiceConfig::default())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| SemuError::Embedding("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: &self.config.model,
            input: texts,
        };

        let url = format!("{}/v1/embeddings", self.config.url);
        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(SemuError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SemuError::Embedding(format!(
                "embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(SemuError::Http)?;

        if embed_response.data.len() != texts.len() {
            return Err(SemuError::Embedding(format!(
                "embedding service returned {} vectors for {} inputs",
                embed_response.data.len(),
                texts.len()
            )));
        }

        Ok(embed_response
            .data
            .into_iter()
            .map(|data| data.embedding)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config_for(server: &MockServer) -> EmbeddingServiceConfig {
        EmbeddingServiceConfig {
            url: server.base_url(),
            model: "nlpai-lab/KoE5".to_string(),
            dimensions: 4,
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_embed_batch_wire_format() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/embeddings")
                .header("Authorization", "Bearer test-key")
                .json_body_partial(r#"{"model": "nlpai-lab/KoE5"}"#);
            then.status(200).json_body(serde_json::json!({
                "data": [
                    {"embedding": [1.0, 0.0, 0.0, 0.0]},
                    {"embedding": [0.0, 1.0, 0.0, 0.0]}
                ]
            }));
        });

        let embedder = HttpEmbedder::new(config_for(&server)).unwrap();
        let vectors = embedder
            .embed_batch(&["접대비".to_string(), "복리후생비".to_string()])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_embed_error_on_http_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(503).body("overloaded");
        });

        let embedder = HttpEmbedder::new(config_for(&server)).unwrap();
        assert!(embedder.embed("query").await.is_err());
    }

    #[tokio::test]
    async fn test_embed_error_on_count_mismatch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200)
                .json_body(serde_json::json!({"data": []}));
        });

        let embedder = HttpEmbedder::new(config_for(&server)).unwrap();
        assert!(embedder.embed("query").await.is_err());
    }
}
