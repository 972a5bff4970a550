//! Semu Core Library
//!
//! Retrieval-augmented tax consultation for Korean solo proprietors.
//!
//! # Features
//! - Unit-normalized inner-product similarity index with atomic rebuild
//! - Local or remote (Pinecone-style) vector retrieval with a fixed
//!   degraded-mode fallback context
//! - Ordered generation failover across Gemini and OpenAI with per-attempt
//!   timeouts
//! - Structured-answer parsing that degrades to raw passthrough
//! - Expense classification into a closed set of account categories

pub mod answer;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod search;

pub use answer::{
    parse_answer, try_parse_answer, Advisor, AskOutcome, CategoryCode, Classification,
    GenerationMeta, ParsedAnswer, UnmeteredGate, UsageGate,
};
pub use config::{Config, EmbeddingServiceConfig, GenerationConfig, RetrievalConfig};
pub use error::{Result, SemuError};
pub use knowledge::{load_corpus, Document, SimilarityIndex};
pub use llm::{
    Embedder, GeminiProvider, GenerationProvider, GenerationRequest, GenerationResult,
    GenerationRouter, HttpEmbedder, OpenAiProvider, PROVIDER_NONE, UNAVAILABLE_MESSAGE,
};
pub use search::{
    fallback_context, LocalBackend, RemoteBackend, RetrievalRouter, ScoredDocument, SearchFilter,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "semu";
