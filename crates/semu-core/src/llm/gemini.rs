//! Gemini generateContent provider
//!
//! Gemini has no separate system role on this endpoint, so the system
//! instruction is prepended to the prompt; token counts fall back to a
//! length estimate when `usageMetadata` is absent.

use super::{GenerationProvider, GenerationRequest, GenerationResult};
use crate::error::{Result, SemuError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Provider for the Gemini REST API
pub struct GeminiProvider {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(SemuError::Http)?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            contents: Vec<Content<'a>>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            temperature: f32,
            #[serde(rename = "maxOutputTokens")]
            max_output_tokens: u32,
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            candidates: Vec<Candidate>,
            #[serde(rename = "usageMetadata")]
            usage_metadata: Option<UsageMetadata>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            parts: Vec<CandidatePart>,
        }

        #[derive(Deserialize)]
        struct CandidatePart {
            text: String,
        }

        #[derive(Deserialize)]
        struct UsageMetadata {
            #[serde(rename = "promptTokenCount")]
            prompt_token_count: Option<u32>,
            #[serde(rename = "candidatesTokenCount")]
            candidates_token_count: Option<u32>,
        }

        let full_prompt = match request.system {
            Some(ref system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &full_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let start = Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(SemuError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SemuError::ExternalError(format!(
                "Gemini error (HTTP {}): {}",
                status, text
            )));
        }

        let generate_response: GenerateResponse =
            response.json().await.map_err(SemuError::Http)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let content = generate_response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| SemuError::Llm("no candidates in Gemini response".to_string()))?;

        let (input_tokens, output_tokens) = match generate_response.usage_metadata {
            Some(usage) => (
                usage
                    .prompt_token_count
                    .unwrap_or_else(|| super::estimate_tokens(&full_prompt)),
                usage
                    .candidates_token_count
                    .unwrap_or_else(|| super::estimate_tokens(&content)),
            ),
            None => (
                super::estimate_tokens(&full_prompt),
                super::estimate_tokens(&content),
            ),
        };

        Ok(GenerationResult {
            content,
            provider: self.name().to_string(),
            model: self.model.clone(),
            input_tokens,
            output_tokens,
            latency_ms,
        })
    }
}
