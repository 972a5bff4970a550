//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via an OpenAI-compatible service
//! - Chat generation via Gemini and OpenAI, with ordered failover

mod gemini;
mod http_embedder;
mod openai;
mod router;
mod traits;

pub use gemini::GeminiProvider;
pub use http_embedder::HttpEmbedder;
pub use openai::OpenAiProvider;
pub use router::GenerationRouter;
pub use traits::{Embedder, GenerationProvider};

use serde::Serialize;

/// Sentinel provider/model identity meaning "no real provider responded"
pub const PROVIDER_NONE: &str = "none";

/// Fixed user-visible message for the total-failure degraded state
pub const UNAVAILABLE_MESSAGE: &str =
    "죄송합니다. 현재 AI 서비스를 이용할 수 없습니다. 잠시 후 다시 시도해주세요.";

/// One generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: 0.3,
            max_tokens: 1000,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Result of one successful (or degraded) generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: u64,
}

impl GenerationResult {
    /// The canned degraded result returned when every provider failed
    pub fn unavailable() -> Self {
        Self {
            content: UNAVAILABLE_MESSAGE.to_string(),
            provider: PROVIDER_NONE.to_string(),
            model: PROVIDER_NONE.to_string(),
            input_tokens: 0,
            output_tokens: 0,
            latency_ms: 0,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.provider == PROVIDER_NONE
    }
}

/// Rough token estimate for providers that omit usage counts
pub(crate) fn estimate_tokens(text: &str) -> u32 {
    (text.len() / 4) as u32
}
