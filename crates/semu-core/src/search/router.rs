//! Retrieval router
//!
//! Picks a backend once at startup (remote when configured and
//! reachable, local otherwise) and presents one search surface that
//! never fails: whenever the selected backend cannot produce context —
//! index not ready, embedding unavailable, remote error, zero hits —
//! the fixed degraded-mode document is returned so generation always has
//! some grounding text.

use super::{LocalBackend, RemoteBackend, ScoredDocument, SearchFilter};
use crate::config::Config;
use crate::error::{Result, SemuError};
use crate::knowledge::Document;
use crate::llm::Embedder;
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// Baseline-principles context used whenever retrieval degrades.
    /// Byte-identical on every call; tests depend on that.
    static ref FALLBACK_DOCUMENT: Document = Document {
        id: "fallback_1".to_string(),
        content: "\
한국 세법 기본 원칙:
1. 사업과 직접 관련된 지출만 경비 인정
2. 적격증빙(세금계산서, 카드영수증 등) 필요
3. 접대비는 한도 있음 (기본 1,200만원 + 매출 비례)
4. 개인적 지출은 경비 불인정
5. 복리후생비는 사회통념상 적정 범위 내 인정"
            .to_string(),
        question: None,
        source: Some("기본 세법 원칙".to_string()),
        category: Some("general".to_string()),
        subcategory: None,
        keywords: Vec::new(),
        business_types: Vec::new(),
    };
}

/// The fixed single-document degraded-mode context
pub fn fallback_context() -> Vec<ScoredDocument> {
    vec![ScoredDocument {
        document: FALLBACK_DOCUMENT.clone(),
        score: 1.0,
        rank: 0,
    }]
}

enum Backend {
    Local(Arc<LocalBackend>),
    Remote(Arc<RemoteBackend>),
}

/// Uniform retrieval surface over the selected backend
pub struct RetrievalRouter {
    backend: Backend,
}

impl RetrievalRouter {
    /// Select a backend from configuration
    ///
    /// A configured remote URL is probed once; on failure the router
    /// falls back to the local index rather than erroring.
    pub async fn from_config(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if let Some(ref url) = config.retrieval.remote_url {
            let remote = RemoteBackend::new(url.clone(), &config.retrieval, embedder.clone())?;
            if remote.probe().await {
                tracing::info!("using remote vector service: {}", url);
                return Ok(Self::remote(Arc::new(remote)));
            }
            tracing::warn!("remote vector service not usable; falling back to local index");
        }

        let local = LocalBackend::open(embedder, config.knowledge_dir(), config.store_dir()).await;
        tracing::info!("using local index: {} documents", local.document_count());
        Ok(Self::local(Arc::new(local)))
    }

    pub fn local(backend: Arc<LocalBackend>) -> Self {
        Self {
            backend: Backend::Local(backend),
        }
    }

    pub fn remote(backend: Arc<RemoteBackend>) -> Self {
        Self {
            backend: Backend::Remote(backend),
        }
    }

    /// Search the backend; degrade to the fixed context instead of failing
    pub async fn search(&self, query: &str, k: usize, filter: &SearchFilter) -> Vec<ScoredDocument> {
        let results = match self.backend {
            Backend::Local(ref local) => {
                if !local.is_ready() {
                    tracing::debug!("local index not ready; using fallback context");
                    return fallback_context();
                }
                local.search(query, k, filter).await
            }
            Backend::Remote(ref remote) => remote.search(query, k, filter).await,
        };

        match results {
            Ok(results) if !results.is_empty() => results,
            Ok(_) => {
                tracing::debug!("retrieval returned no documents; using fallback context");
                fallback_context()
            }
            Err(e) => {
                tracing::warn!("retrieval failed ({}); using fallback context", e);
                fallback_context()
            }
        }
    }

    /// Rebuild the local index; the remote backend is read-only
    pub async fn rebuild(&self) -> Result<usize> {
        match self.backend {
            Backend::Local(ref local) => local.rebuild().await,
            Backend::Remote(_) => Err(SemuError::Index(
                "remote vector service cannot be rebuilt from here".to_string(),
            )),
        }
    }

    pub fn is_ready(&self) -> bool {
        match self.backend {
            Backend::Local(ref local) => local.is_ready(),
            Backend::Remote(_) => true,
        }
    }

    pub fn backend_info(&self) -> String {
        match self.backend {
            Backend::Local(ref local) => {
                format!("local index ({} documents)", local.document_count())
            }
            Backend::Remote(_) => "remote vector service".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SemuError::Embedding("model offline".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(SemuError::Embedding("model offline".to_string()))
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn model_name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_fallback_context_is_fixed() {
        let a = fallback_context();
        let b = fallback_context();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].document.id, "fallback_1");
        assert_eq!(a[0].document.source.as_deref(), Some("기본 세법 원칙"));
        assert_eq!(a[0].score, 1.0);
        assert_eq!(a[0].document.content, b[0].document.content);
    }

    #[tokio::test]
    async fn test_empty_index_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalBackend::open(
            Arc::new(BrokenEmbedder),
            dir.path().join("knowledge"),
            dir.path().join("vector_store"),
        )
        .await;

        let router = RetrievalRouter::local(Arc::new(local));
        assert!(!router.is_ready());

        let results = router.search("아무 질문", 3, &SearchFilter::default()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "fallback_1");
    }
}
