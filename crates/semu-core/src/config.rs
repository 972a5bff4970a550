//! Configuration management
//!
//! Settings are read from a YAML file when present and fall back to
//! environment variables, so a bare deployment with only `GEMINI_API_KEY`
//! exported still comes up with working defaults.

use crate::error::{Result, SemuError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding the knowledge corpus and the persisted index
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,

    /// Generation provider configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Retrieval backend configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            embedding: EmbeddingServiceConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the default path, or defaults when no file exists
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SemuError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Default config file path (`SEMU_CONFIG` overrides)
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("SEMU_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yaml")
    }

    /// Directory of corpus source files (one JSON array per file)
    pub fn knowledge_dir(&self) -> PathBuf {
        self.data_dir.join("knowledge")
    }

    /// Directory of the persisted similarity index
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("vector_store")
    }
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SEMU_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::CONFIG_DIR_NAME)
}

/// Embedding service configuration (OpenAI-compatible `/v1/embeddings`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the embedding service
    pub url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimensions
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("SEMU_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            api_key: std::env::var("SEMU_EMBEDDING_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_embedding_model() -> String {
    std::env::var("SEMU_EMBEDDING_MODEL").unwrap_or_else(|_| "nlpai-lab/KoE5".to_string())
}

fn default_embedding_dimensions() -> usize {
    std::env::var("SEMU_EMBEDDING_DIMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1024)
}

fn default_timeout() -> u64 {
    30
}

/// Generation provider configuration
///
/// Only providers with an API key participate in the fallback chain.
/// Gemini is tried first, then OpenAI, matching the original priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Gemini API base URL (overridable for self-hosted gateways)
    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_openai_url")]
    pub openai_url: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            gemini_model: default_gemini_model(),
            gemini_url: default_gemini_url(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: default_openai_model(),
            openai_url: default_openai_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_gemini_model() -> String {
    std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-lite".to_string())
}

fn default_gemini_url() -> String {
    std::env::var("GEMINI_BASE_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
}

fn default_openai_model() -> String {
    std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

fn default_openai_url() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".to_string())
}

/// Retrieval backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Remote vector-search service URL; unset means the local index
    #[serde(default)]
    pub remote_url: Option<String>,

    #[serde(default)]
    pub remote_api_key: Option<String>,

    /// Namespace on the remote service
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Documents retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            remote_url: std::env::var("SEMU_VECTOR_URL").ok(),
            remote_api_key: std::env::var("SEMU_VECTOR_API_KEY").ok(),
            namespace: default_namespace(),
            top_k: default_top_k(),
        }
    }
}

fn default_namespace() -> String {
    std::env::var("SEMU_VECTOR_NAMESPACE").unwrap_or_else(|_| "tax_rules".to_string())
}

fn default_top_k() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
data_dir: /tmp/semu-data
embedding:
  url: http://embed.internal:9000
  model: nlpai-lab/KoE5
  dimensions: 1024
generation:
  gemini_model: gemini-2.0-flash-lite
retrieval:
  top_k: 5
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/semu-data"));
        assert_eq!(config.embedding.dimensions, 1024);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.knowledge_dir(), PathBuf::from("/tmp/semu-data/knowledge"));
    }
}
