//! Retrieval over the knowledge corpus
//!
//! One uniform search surface over two interchangeable backends: the
//! local similarity index and a remote vector-search service. The router
//! on top guarantees that callers always get *some* context back.

pub mod local;
pub mod remote;
pub mod router;

pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use router::{fallback_context, RetrievalRouter};

use crate::knowledge::Document;
use serde::Serialize;

/// A retrieved document with its similarity score and retrieval rank
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    /// Inner-product similarity in [-1, 1]
    pub score: f32,
    /// Zero-based position in the result list
    pub rank: usize,
}

/// Metadata filter applied to retrieved documents
///
/// A document passes when each requested field either matches the value
/// or carries the `"all"` wildcard marker.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub category: Option<String>,
    pub business_type: Option<String>,
    pub keyword: Option<String>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.business_type.is_none() && self.keyword.is_none()
    }

    pub fn matches(&self, document: &Document) -> bool {
        if let Some(ref category) = self.category {
            match document.category.as_deref() {
                Some(doc_category) => {
                    if doc_category != category && doc_category != "all" {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if let Some(ref business_type) = self.business_type {
            if !list_matches(&document.business_types, business_type) {
                return false;
            }
        }

        if let Some(ref keyword) = self.keyword {
            if !list_matches(&document.keywords, keyword) {
                return false;
            }
        }

        true
    }
}

fn list_matches(values: &[String], wanted: &str) -> bool {
    values.iter().any(|v| v == wanted || v == "all")
}
