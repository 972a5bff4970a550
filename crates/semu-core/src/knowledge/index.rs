//! Similarity index
//!
//! Holds the corpus documents paired 1:1 with a matrix of unit-normalized
//! embeddings. Row i of the matrix always belongs to document i; the pair
//! is only ever replaced wholesale, never patched. Search is an exact
//! inner-product scan (cosine similarity on normalized vectors).

use crate::error::{Result, SemuError};
use crate::knowledge::Document;
use crate::llm::Embedder;
use crate::search::ScoredDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const VECTORS_FILE: &str = "vectors.bin";
const DOCUMENTS_FILE: &str = "documents.json";

/// In-memory similarity index over the knowledge corpus
#[derive(Debug)]
pub struct SimilarityIndex {
    documents: Vec<Document>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
    built_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct ManifestRef<'a> {
    dimension: usize,
    built_at: Option<DateTime<Utc>>,
    documents: &'a [Document],
}

#[derive(Deserialize)]
struct Manifest {
    dimension: usize,
    built_at: Option<DateTime<Utc>>,
    documents: Vec<Document>,
}

impl SimilarityIndex {
    /// An empty index of the given dimension (valid, reports not-ready)
    pub fn empty(dimension: usize) -> Self {
        Self {
            documents: Vec::new(),
            vectors: Vec::new(),
            dimension,
            built_at: None,
        }
    }

    /// Build an index by embedding every corpus document
    ///
    /// A document whose embedding fails is logged and skipped; the build
    /// itself never fails. An empty result is a valid empty index.
    pub async fn build(corpus: Vec<Document>, embedder: &dyn Embedder) -> Self {
        let dimension = embedder.dimensions();
        let total = corpus.len();
        let mut documents = Vec::with_capacity(total);
        let mut vectors = Vec::with_capacity(total);

        for (i, doc) in corpus.into_iter().enumerate() {
            match embedder.embed(&doc.embedding_text()).await {
                Ok(mut vector) => {
                    if vector.len() != dimension {
                        tracing::warn!(
                            "skipping document {}: embedding has {} dims, expected {}",
                            doc.id,
                            vector.len(),
                            dimension
                        );
                        continue;
                    }
                    normalize(&mut vector);
                    vectors.push(vector);
                    documents.push(doc);
                }
                Err(e) => {
                    tracing::warn!("skipping document {}: embedding failed: {}", doc.id, e);
                }
            }
            if (i + 1) % 10 == 0 {
                tracing::debug!("embedded {}/{} documents", i + 1, total);
            }
        }

        if documents.is_empty() {
            tracing::warn!("index built with no documents");
        } else {
            tracing::info!("index built: {} of {} documents", documents.len(), total);
        }

        Self {
            documents,
            vectors,
            dimension,
            built_at: Some(Utc::now()),
        }
    }

    /// Score every stored vector against the (normalized) query vector
    ///
    /// Returns the top-k by descending inner product; ties keep insertion
    /// order (the sort is stable). Fewer than k results when the index is
    /// small, empty when it is empty. Never fails.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredDocument> {
        if self.vectors.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| (i, dot(query, vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (i, score))| ScoredDocument {
                document: self.documents[i].clone(),
                score,
                rank,
            })
            .collect()
    }

    /// Durably write the paired artifacts under `dir`
    ///
    /// Each artifact is written to a temporary name and renamed into
    /// place; `load` validates the pairing, so a torn pair degrades to a
    /// rebuild rather than a partial load.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let vectors_path = dir.join(VECTORS_FILE);
        let vectors_tmp = dir.join(format!("{}.tmp", VECTORS_FILE));
        std::fs::write(&vectors_tmp, self.matrix_bytes())?;
        std::fs::rename(&vectors_tmp, &vectors_path)?;

        let manifest = ManifestRef {
            dimension: self.dimension,
            built_at: self.built_at,
            documents: &self.documents,
        };
        let documents_path = dir.join(DOCUMENTS_FILE);
        let documents_tmp = dir.join(format!("{}.tmp", DOCUMENTS_FILE));
        std::fs::write(&documents_tmp, serde_json::to_vec(&manifest)?)?;
        std::fs::rename(&documents_tmp, &documents_path)?;

        tracing::info!(
            "persisted index: {} documents to {}",
            self.documents.len(),
            dir.display()
        );
        Ok(())
    }

    /// Load the paired artifacts from `dir`, failing closed
    ///
    /// Any missing file, malformed header, dimension mismatch, or
    /// row/document count mismatch is an error; the caller responds by
    /// rebuilding from the corpus instead of propagating it further.
    pub fn load(dir: &Path, expected_dimension: usize) -> Result<Self> {
        let bytes = std::fs::read(dir.join(VECTORS_FILE))?;
        let (count, dimension, vectors) = read_matrix(&bytes)?;

        if dimension != expected_dimension {
            return Err(SemuError::Index(format!(
                "stored dimension {} does not match configured {}",
                dimension, expected_dimension
            )));
        }

        let manifest_bytes = std::fs::read(dir.join(DOCUMENTS_FILE))?;
        let manifest: Manifest = serde_json::from_slice(&manifest_bytes)?;

        if manifest.dimension != dimension {
            return Err(SemuError::Index(format!(
                "document manifest dimension {} does not match matrix {}",
                manifest.dimension, dimension
            )));
        }
        if manifest.documents.len() != count {
            return Err(SemuError::Index(format!(
                "document count {} does not match vector count {}",
                manifest.documents.len(),
                count
            )));
        }

        tracing::info!("loaded index: {} documents from {}", count, dir.display());
        Ok(Self {
            documents: manifest.documents,
            vectors,
            dimension,
            built_at: manifest.built_at,
        })
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_ready(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    fn matrix_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(16 + self.vectors.len() * self.dimension * 4);
        bytes.extend_from_slice(&(self.vectors.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u64).to_le_bytes());
        for vector in &self.vectors {
            for value in vector {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes
    }
}

fn read_matrix(bytes: &[u8]) -> Result<(usize, usize, Vec<Vec<f32>>)> {
    if bytes.len() < 16 {
        return Err(SemuError::Index("vector matrix header truncated".to_string()));
    }
    let count = u64::from_le_bytes(bytes[0..8].try_into().unwrap_or_default()) as usize;
    let dimension = u64::from_le_bytes(bytes[8..16].try_into().unwrap_or_default()) as usize;

    let expected = 16 + count * dimension * 4;
    if bytes.len() != expected {
        return Err(SemuError::Index(format!(
            "vector matrix is {} bytes, expected {}",
            bytes.len(),
            expected
        )));
    }

    let mut vectors = Vec::with_capacity(count);
    let mut offset = 16;
    for _ in 0..count {
        let row: Vec<f32> = bytes[offset..offset + dimension * 4]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        vectors.push(row);
        offset += dimension * 4;
    }

    Ok((count, dimension, vectors))
}

/// Scale a vector to unit L2 norm in place (zero vectors are left as-is)
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Inner product of two equal-length vectors (0.0 on length mismatch)
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
