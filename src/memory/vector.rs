// SPDX-License-Identifier: MIT

//! In-memory similarity index

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Embedder;
use crate::error::ScholarError;

/// A document with free-form metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }
}

/// A query hit with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: String,
    pub document: Document,
    pub score: f32,
}

/// Similarity index capability
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Insert documents, returning their ids (generated when not supplied)
    async fn add_documents(
        &self,
        documents: Vec<Document>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>, ScholarError>;

    /// Rank the `k` most similar documents, optionally filtered by
    /// metadata equality
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Vec<ScoredDocument>, ScholarError>;
}

struct Entry {
    id: String,
    document: Document,
    vector: Vec<f32>,
}

/// Cosine-similarity index over embedded documents
///
/// Safe to share across concurrent workflow runs; reads and writes go
/// through an internal `RwLock`.
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryVectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of indexed documents
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SimilarityIndex for InMemoryVectorIndex {
    async fn add_documents(
        &self,
        documents: Vec<Document>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>, ScholarError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let ids = match ids {
            Some(ids) => {
                if ids.len() != documents.len() {
                    return Err(ScholarError::Index(format!(
                        "{} ids supplied for {} documents",
                        ids.len(),
                        documents.len()
                    )));
                }
                ids
            }
            None => documents
                .iter()
                .map(|_| Uuid::new_v4().to_string())
                .collect(),
        };

        let mut new_entries = Vec::with_capacity(documents.len());
        for (id, document) in ids.iter().cloned().zip(documents) {
            let vector = self.embedder.embed(&document.page_content).await?;
            new_entries.push(Entry {
                id,
                document,
                vector,
            });
        }

        let mut entries = self.entries.write().await;
        for entry in new_entries {
            match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }

        Ok(ids)
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Vec<ScoredDocument>, ScholarError> {
        let query_vector = self.embedder.embed(query).await?;
        let entries = self.entries.read().await;

        let mut hits: Vec<ScoredDocument> = entries
            .iter()
            .filter(|entry| matches_filter(&entry.document.metadata, filter))
            .map(|entry| ScoredDocument {
                id: entry.id.clone(),
                document: entry.document.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }
}

fn matches_filter(metadata: &Map<String, Value>, filter: Option<&Map<String, Value>>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter.iter().all(|(k, v)| metadata.get(k) == Some(v)),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Deterministic embedder: character histogram over a small bucket space
    pub(crate) struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ScholarError> {
            let mut vector = vec![0.0f32; 16];
            for byte in text.bytes() {
                vector[(byte % 16) as usize] += 1.0;
            }
            Ok(vector)
        }
    }

    fn index() -> InMemoryVectorIndex {
        InMemoryVectorIndex::new(Arc::new(StubEmbedder))
    }

    #[tokio::test]
    async fn test_add_empty_returns_no_ids() {
        let index = index();
        let ids = index.add_documents(vec![], None).await.unwrap();
        assert!(ids.is_empty());
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_generates_ids() {
        let index = index();
        let ids = index
            .add_documents(vec![Document::new("a"), Document::new("b")], None)
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(index.len().await, 2);
    }

    #[tokio::test]
    async fn test_add_id_count_mismatch() {
        let index = index();
        let result = index
            .add_documents(vec![Document::new("a")], Some(vec![]))
            .await;
        assert!(matches!(result, Err(ScholarError::Index(_))));
    }

    #[tokio::test]
    async fn test_add_same_id_replaces() {
        let index = index();
        let ids = Some(vec!["doc-1".to_string()]);
        index
            .add_documents(vec![Document::new("old")], ids.clone())
            .await
            .unwrap();
        index
            .add_documents(vec![Document::new("new")], ids)
            .await
            .unwrap();

        assert_eq!(index.len().await, 1);
        let hits = index.similarity_search("new", 1, None).await.unwrap();
        assert_eq!(hits[0].document.page_content, "new");
    }

    #[tokio::test]
    async fn test_query_ranks_most_similar_first() {
        let index = index();
        index
            .add_documents(
                vec![
                    Document::new("x-ray diffraction"),
                    Document::new("zzzzzzzzzz"),
                ],
                None,
            )
            .await
            .unwrap();

        let hits = index
            .similarity_search("x-ray diffraction", 2, None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.page_content, "x-ray diffraction");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_query_respects_k() {
        let index = index();
        index
            .add_documents(
                (0..5).map(|i| Document::new(format!("doc {}", i))).collect(),
                None,
            )
            .await
            .unwrap();

        let hits = index.similarity_search("doc", 2, None).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_metadata_filter() {
        let index = index();
        let mut kept = Document::new("same text");
        kept.metadata.insert("source".to_string(), json!("arxiv"));
        let mut dropped = Document::new("same text");
        dropped.metadata.insert("source".to_string(), json!("web"));

        index
            .add_documents(vec![kept, dropped], None)
            .await
            .unwrap();

        let mut filter = Map::new();
        filter.insert("source".to_string(), json!("arxiv"));
        let hits = index
            .similarity_search("same text", 10, Some(&filter))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.metadata["source"], json!("arxiv"));
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        let same = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]);
        assert!((same - 1.0).abs() < 1e-6);
    }
}
