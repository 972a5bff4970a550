//! Knowledge corpus
//!
//! The corpus is a set of JSON files, each holding one array of documents.
//! Documents are immutable once indexed; a corpus change means a full
//! index rebuild, never an in-place patch.

pub mod index;

pub use index::SimilarityIndex;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of the knowledge corpus
///
/// `question` marks FAQ-style entries; their embedding text combines the
/// question with the answer so queries phrased as questions land near them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub business_types: Vec<String>,
}

impl Document {
    /// Text fed to the embedding model for this document
    pub fn embedding_text(&self) -> String {
        match &self.question {
            Some(question) => format!("질문: {}\n답변: {}", question, self.content),
            None => self.content.clone(),
        }
    }
}

/// Load every `*.json` corpus file under `dir`
///
/// Files are read in name order so the document sequence (and therefore
/// index insertion order) is stable across rebuilds. A missing directory
/// yields an empty corpus; an unreadable file is skipped with a warning.
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    if !dir.exists() {
        tracing::warn!("knowledge directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping unreadable corpus file {}: {}", path.display(), e);
                continue;
            }
        };
        match serde_json::from_str::<Vec<Document>>(&content) {
            Ok(mut batch) => {
                tracing::debug!("loaded {} documents from {}", batch.len(), path.display());
                documents.append(&mut batch);
            }
            Err(e) => {
                tracing::warn!("skipping malformed corpus file {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!("corpus loaded: {} documents", documents.len());
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_plain() {
        let doc = Document {
            id: "d1".into(),
            content: "접대비 한도".into(),
            question: None,
            source: None,
            category: None,
            subcategory: None,
            keywords: vec![],
            business_types: vec![],
        };
        assert_eq!(doc.embedding_text(), "접대비 한도");
    }

    #[test]
    fn test_embedding_text_faq() {
        let doc = Document {
            id: "faq1".into(),
            content: "네, 인정됩니다.".into(),
            question: Some("식대도 경비인가요?".into()),
            source: None,
            category: None,
            subcategory: None,
            keywords: vec![],
            business_types: vec![],
        };
        assert_eq!(doc.embedding_text(), "질문: 식대도 경비인가요?\n답변: 네, 인정됩니다.");
    }

    #[test]
    fn test_load_corpus_missing_dir() {
        let docs = load_corpus(Path::new("/nonexistent/semu-knowledge")).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_load_corpus_reads_json_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_rules.json"),
            r#"[{"id": "b1", "content": "rule b"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a_rules.json"),
            r#"[{"id": "a1", "content": "rule a", "keywords": ["vat"]}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "a1");
        assert_eq!(docs[0].keywords, vec!["vat"]);
        assert_eq!(docs[1].id, "b1");
    }
}
