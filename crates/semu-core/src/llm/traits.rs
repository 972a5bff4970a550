//! LLM trait definitions

use super::{GenerationRequest, GenerationResult};
use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
///
/// Implementations must be deterministic for a fixed model version: the
/// same text yields the same vector, which is what makes stubbed tests
/// reproducible. Returned vectors are normalized by the caller, not here.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// One language-model provider in the fallback chain
///
/// `generate` is the uniform attempt operation: the router composes
/// providers with a first-success-wins reduction, so any failure here is
/// "try the next one", never a user-visible error.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider identity, e.g. "gemini" or "openai"
    fn name(&self) -> &str;

    /// Model identity reported in results
    fn model_name(&self) -> &str;

    /// Attempt one generation
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;
}
