//! In-memory vector index over pre-embedded documents.
//!
//! The index is a JSONL file where every line is a document with its
//! embedding:
//!
//! ```text
//! {"page_content": "...", "metadata": {"employee_id": "E-104"}, "embedding": [0.12, ...]}
//! ```
//!
//! Queries are embedded through the configured [`Provider`] and ranked by
//! cosine similarity.

use async_trait::async_trait;
use roster_core::error::SearchError;
use roster_core::provider::{EmbeddingRequest, Provider};
use roster_core::search::{Document, ScoredDocument, VectorStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the lengths differ or either vector is empty or zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// A document together with its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Brute-force similarity search over documents held in memory.
pub struct InMemoryVectorStore {
    provider: Arc<dyn Provider>,
    embedding_model: String,
    documents: Vec<IndexedDocument>,
}

impl InMemoryVectorStore {
    pub fn new(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        documents: Vec<IndexedDocument>,
    ) -> Self {
        Self {
            provider,
            embedding_model: embedding_model.into(),
            documents,
        }
    }

    /// Load an index from a JSONL file. Blank lines are skipped.
    pub async fn load_jsonl(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, SearchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SearchError::Unavailable(format!("Failed to read index {}: {e}", path.display()))
        })?;

        let documents = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<IndexedDocument>(line).map_err(|e| {
                    SearchError::Unavailable(format!(
                        "Malformed index entry at {}:{}: {e}",
                        path.display(),
                        i + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(documents = documents.len(), "Loaded vector index from {}", path.display());
        Ok(Self::new(provider, embedding_model, documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(|e| SearchError::EmbeddingFailed(e.to_string()))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::EmbeddingFailed("Provider returned no embedding".into()))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        if k == 0 || self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_query(query).await?;

        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .map(|indexed| ScoredDocument {
                document: indexed.document.clone(),
                score: cosine_similarity(&indexed.embedding, &query_embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(query, hits = scored.len(), "Vector search complete");
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::error::ProviderError;
    use roster_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};

    /// Embeds text as keyword presence flags.
    struct KeywordEmbedder;

    fn embed_text(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        ["carlos", "finance", "engineering", "alice"]
            .iter()
            .map(|kw| if lower.contains(kw) { 1.0 } else { 0.0 })
            .collect()
    }

    #[async_trait]
    impl Provider for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("completion not supported".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|t| embed_text(t)).collect(),
                model: request.model,
            })
        }
    }

    struct Offline;

    #[async_trait]
    impl Provider for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }

        async fn embed(&self, _request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    fn doc(text: &str) -> IndexedDocument {
        IndexedDocument {
            document: Document {
                page_content: text.into(),
                metadata: serde_json::Map::new(),
            },
            embedding: embed_text(text),
        }
    }

    fn store() -> InMemoryVectorStore {
        InMemoryVectorStore::new(
            Arc::new(KeywordEmbedder),
            "test-embed",
            vec![
                doc("Alice, Engineering"),
                doc("Carlos Ruiz, Finance"),
                doc("Carlos Diaz, Engineering"),
            ],
        )
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn ranks_most_relevant_first() {
        let hits = store().similarity_search_with_score("Carlos in finance", 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].document.page_content, "Carlos Ruiz, Finance");
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn respects_k() {
        let hits = store().similarity_search_with_score("Carlos", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store().similarity_search_with_score("Carlos", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn embedding_failure_maps_to_search_error() {
        let store = InMemoryVectorStore::new(Arc::new(Offline), "m", vec![doc("Carlos")]);
        let err = store.similarity_search_with_score("Carlos", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::EmbeddingFailed(_)));
    }

    #[tokio::test]
    async fn loads_jsonl_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.jsonl");
        let lines = [doc("Alice, Engineering"), doc("Carlos Ruiz, Finance")]
            .iter()
            .map(|d| serde_json::to_string(d).unwrap())
            .collect::<Vec<_>>()
            .join("\n\n");
        std::fs::write(&path, lines).unwrap();

        let store = InMemoryVectorStore::load_jsonl(Arc::new(KeywordEmbedder), "m", &path)
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn missing_index_is_unavailable() {
        let err = InMemoryVectorStore::load_jsonl(Arc::new(KeywordEmbedder), "m", "/no/such/index.jsonl")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }
}
