//! Generation router with ordered provider failover
//!
//! Providers are tried strictly in priority order. Each attempt is
//! time-boxed; a timeout counts as a failure like any other and the next
//! provider is tried. The first success wins. When every provider fails
//! (or none is configured) the router returns the canned "none" result
//! instead of an error.

use super::{GenerationProvider, GenerationRequest, GenerationResult};
use crate::config::GenerationConfig;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Ordered chain of generation providers
pub struct GenerationRouter {
    providers: Vec<Arc<dyn GenerationProvider>>,
    attempt_timeout: Duration,
}

impl GenerationRouter {
    /// Create a router over an explicit provider list
    pub fn new(providers: Vec<Arc<dyn GenerationProvider>>, attempt_timeout: Duration) -> Self {
        Self {
            providers,
            attempt_timeout,
        }
    }

    /// Build the provider chain from configuration
    ///
    /// Only providers with credentials participate: Gemini first, then
    /// OpenAI. A router with no providers is valid and always degrades.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let mut providers: Vec<Arc<dyn GenerationProvider>> = Vec::new();

        if let Some(ref api_key) = config.gemini_api_key {
            providers.push(Arc::new(super::GeminiProvider::new(
                config.gemini_url.clone(),
                api_key.clone(),
                config.gemini_model.clone(),
                config.timeout_secs,
            )?));
        }

        if let Some(ref api_key) = config.openai_api_key {
            providers.push(Arc::new(super::OpenAiProvider::new(
                config.openai_url.clone(),
                api_key.clone(),
                config.openai_model.clone(),
                config.timeout_secs,
            )?));
        }

        if providers.is_empty() {
            tracing::warn!("no generation providers configured; responses will be degraded");
        } else {
            tracing::info!(
                "generation providers: {}",
                providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
        }

        Ok(Self::new(providers, Duration::from_secs(config.timeout_secs)))
    }

    /// Generate with failover; never fails
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        for provider in &self.providers {
            match timeout(self.attempt_timeout, provider.generate(request)).await {
                Ok(Ok(result)) => {
                    tracing::debug!(
                        provider = provider.name(),
                        latency_ms = result.latency_ms,
                        "generation succeeded"
                    );
                    return result;
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider = provider.name(), "generation failed: {}", e);
                }
                Err(_) => {
                    tracing::warn!(
                        provider = provider.name(),
                        "generation timed out after {:?}",
                        self.attempt_timeout
                    );
                }
            }
        }

        tracing::warn!("all generation providers failed; returning degraded result");
        GenerationResult::unavailable()
    }

    /// Provider identities in priority order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }
}
