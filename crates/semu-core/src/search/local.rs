//! Local search backend
//!
//! Owns the similarity index behind an `RwLock<Arc<...>>`: searches
//! clone the `Arc` and read without holding the lock, while `rebuild`
//! constructs a complete replacement off to the side and publishes it in
//! one swap. No reader ever observes a half-built index.

use super::{ScoredDocument, SearchFilter};
use crate::error::Result;
use crate::knowledge::{self, SimilarityIndex};
use crate::llm::Embedder;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Search backend over the on-disk knowledge corpus
pub struct LocalBackend {
    index: RwLock<Arc<SimilarityIndex>>,
    embedder: Arc<dyn Embedder>,
    knowledge_dir: PathBuf,
    store_dir: PathBuf,
}

impl LocalBackend {
    /// Open the backend: load the persisted index, or build from corpus
    ///
    /// Loading fails closed — any corruption or schema mismatch triggers
    /// a full build instead of surfacing an error. A corpus whose every
    /// document fails to embed yields a valid empty index.
    pub async fn open(
        embedder: Arc<dyn Embedder>,
        knowledge_dir: PathBuf,
        store_dir: PathBuf,
    ) -> Self {
        let index = match SimilarityIndex::load(&store_dir, embedder.dimensions()) {
            Ok(index) => index,
            Err(e) => {
                tracing::info!("persisted index unusable ({}); building from corpus", e);
                Self::build_and_persist(embedder.as_ref(), &knowledge_dir, &store_dir).await
            }
        };

        Self {
            index: RwLock::new(Arc::new(index)),
            embedder,
            knowledge_dir,
            store_dir,
        }
    }

    async fn build_and_persist(
        embedder: &dyn Embedder,
        knowledge_dir: &std::path::Path,
        store_dir: &std::path::Path,
    ) -> SimilarityIndex {
        let corpus = match knowledge::load_corpus(knowledge_dir) {
            Ok(corpus) => corpus,
            Err(e) => {
                tracing::warn!("corpus unreadable ({}); starting with empty index", e);
                Vec::new()
            }
        };

        let index = SimilarityIndex::build(corpus, embedder).await;
        if let Err(e) = index.persist(store_dir) {
            tracing::warn!("failed to persist index: {}", e);
        }
        index
    }

    /// Current index snapshot; searches run against it lock-free
    fn snapshot(&self) -> Arc<SimilarityIndex> {
        match self.index.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rebuild from the corpus and atomically swap the new index in
    pub async fn rebuild(&self) -> Result<usize> {
        let corpus = knowledge::load_corpus(&self.knowledge_dir)?;
        let index = SimilarityIndex::build(corpus, self.embedder.as_ref()).await;
        index.persist(&self.store_dir)?;

        let count = index.document_count();
        let replacement = Arc::new(index);
        match self.index.write() {
            Ok(mut guard) => *guard = replacement,
            Err(poisoned) => *poisoned.into_inner() = replacement,
        }
        tracing::info!("index rebuilt: {} documents", count);
        Ok(count)
    }

    /// Embed the query and search the current snapshot
    ///
    /// When a filter is present the search oversamples (2k) before
    /// filtering so that filtered-out neighbors do not starve the result.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredDocument>> {
        let mut query_vector = self.embedder.embed(query).await?;
        knowledge::index::normalize(&mut query_vector);

        let snapshot = self.snapshot();
        let fetch = if filter.is_empty() { k } else { k * 2 };
        let mut results = snapshot.search(&query_vector, fetch);

        if !filter.is_empty() {
            results.retain(|result| filter.matches(&result.document));
            results.truncate(k);
            for (rank, result) in results.iter_mut().enumerate() {
                result.rank = rank;
            }
        }

        Ok(results)
    }

    pub fn document_count(&self) -> usize {
        self.snapshot().document_count()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ready()
    }
}
