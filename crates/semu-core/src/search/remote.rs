//! Remote vector-search backend
//!
//! Speaks a Pinecone-style `/query` contract: the query embedding is
//! computed locally, posted to the service, and matches come back with
//! document fields in `metadata`. Transport details stay opaque to the
//! retrieval router.

use super::{ScoredDocument, SearchFilter};
use crate::config::RetrievalConfig;
use crate::error::{Result, SemuError};
use crate::knowledge::{self, Document};
use crate::llm::Embedder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Backend delegating similarity search to a remote vector service
pub struct RemoteBackend {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    namespace: String,
    embedder: Arc<dyn Embedder>,
}

impl RemoteBackend {
    pub fn new(
        url: impl Into<String>,
        config: &RetrievalConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SemuError::Http)?;

        Ok(Self {
            http_client,
            url: url.into(),
            api_key: config.remote_api_key.clone(),
            namespace: config.namespace.clone(),
            embedder,
        })
    }

    /// Check that the service answers at all
    pub async fn probe(&self) -> bool {
        let url = format!("{}/describe_index_stats", self.url);
        let mut req = self.http_client.post(&url).json(&json!({}));
        if let Some(ref api_key) = self.api_key {
            req = req.header("Api-Key", api_key);
        }
        match req.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("remote vector service unreachable: {}", e);
                false
            }
        }
    }

    pub async fn search(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredDocument>> {
        #[derive(Serialize)]
        struct QueryRequest<'a> {
            vector: &'a [f32],
            #[serde(rename = "topK")]
            top_k: usize,
            namespace: &'a str,
            #[serde(rename = "includeMetadata")]
            include_metadata: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            filter: Option<serde_json::Value>,
        }

        #[derive(Deserialize)]
        struct QueryResponse {
            #[serde(default)]
            matches: Vec<Match>,
        }

        #[derive(Deserialize)]
        struct Match {
            id: String,
            score: f32,
            #[serde(default)]
            metadata: Metadata,
        }

        #[derive(Deserialize, Default)]
        struct Metadata {
            #[serde(default)]
            content: String,
            #[serde(default)]
            source: Option<String>,
            #[serde(default)]
            category: Option<String>,
            #[serde(default)]
            subcategory: Option<String>,
            #[serde(default)]
            keywords: Vec<String>,
            #[serde(default)]
            business_types: Vec<String>,
        }

        let mut query_vector = self.embedder.embed(query).await?;
        knowledge::index::normalize(&mut query_vector);

        let request = QueryRequest {
            vector: &query_vector,
            top_k: k,
            namespace: &self.namespace,
            include_metadata: true,
            filter: remote_filter(filter),
        };

        let url = format!("{}/query", self.url);
        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.api_key {
            req = req.header("Api-Key", api_key);
        }

        let response = req.send().await.map_err(SemuError::Http)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SemuError::ExternalError(format!(
                "vector service error (HTTP {}): {}",
                status, body
            )));
        }

        let query_response: QueryResponse = response.json().await.map_err(SemuError::Http)?;

        Ok(query_response
            .matches
            .into_iter()
            .enumerate()
            .map(|(rank, m)| ScoredDocument {
                document: Document {
                    id: m.id,
                    content: m.metadata.content,
                    question: None,
                    source: m.metadata.source,
                    category: m.metadata.category,
                    subcategory: m.metadata.subcategory,
                    keywords: m.metadata.keywords,
                    business_types: m.metadata.business_types,
                },
                score: m.score,
                rank,
            })
            .collect())
    }
}

fn remote_filter(filter: &SearchFilter) -> Option<serde_json::Value> {
    if filter.is_empty() {
        return None;
    }
    let mut map = serde_json::Map::new();
    if let Some(ref category) = filter.category {
        map.insert("category".to_string(), json!({ "$eq": category }));
    }
    if let Some(ref business_type) = filter.business_type {
        map.insert(
            "business_types".to_string(),
            json!({ "$in": [business_type, "all"] }),
        );
    }
    if let Some(ref keyword) = filter.keyword {
        map.insert("keywords".to_string(), json!({ "$in": [keyword, "all"] }));
    }
    Some(serde_json::Value::Object(map))
}
