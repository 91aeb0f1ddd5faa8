//! Vector-store adapter.
//!
//! Dispatches on the configured store type and exposes a small
//! add/delete/search surface over an embedding seam. An unsupported type is
//! an operator error naming the supported set.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::AppSettings;
use crate::error::AgentError;
use crate::rag::Document;

/// Supported vector-store types.
pub const SUPPORTED_VECTOR_STORES: [&str; 1] = ["memory"];

/// Text embedding seam.
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;
}

/// Open the configured vector store.
pub fn open_vector_store(
    kind: &str,
    embedder: Arc<dyn EmbeddingModel>,
) -> Result<VectorStore, AgentError> {
    match kind {
        "memory" => Ok(VectorStore {
            entries: Vec::new(),
            next_id: 0,
            embedder,
        }),
        other => Err(AgentError::UnsupportedVectorStore {
            requested: other.to_string(),
            supported: SUPPORTED_VECTOR_STORES.join(", "),
        }),
    }
}

/// Open the vector store named by the settings snapshot's storage section.
pub fn open_from_settings(
    settings: &AppSettings,
    embedder: Arc<dyn EmbeddingModel>,
) -> Result<VectorStore, AgentError> {
    open_vector_store(&settings.storage.vector_store, embedder)
}

struct Entry {
    id: String,
    document: Document,
    vector: Vec<f32>,
}

/// In-memory vector store with cosine-similarity search.
pub struct VectorStore {
    entries: Vec<Entry>,
    next_id: u64,
    embedder: Arc<dyn EmbeddingModel>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("entries", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl VectorStore {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add raw texts with optional metadata and ids. Generated ids are
    /// returned in input order.
    pub fn add_texts(
        &mut self,
        texts: &[String],
        metadatas: Option<&[BTreeMap<String, String>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>, AgentError> {
        let mut assigned = Vec::with_capacity(texts.len());
        for (position, text) in texts.iter().enumerate() {
            let id = match ids.and_then(|ids| ids.get(position)) {
                Some(id) => id.clone(),
                None => {
                    let id = format!("doc-{}", self.next_id);
                    self.next_id += 1;
                    id
                }
            };
            let metadata = metadatas
                .and_then(|m| m.get(position))
                .cloned()
                .unwrap_or_default();
            let vector = self.embedder.embed(text)?;
            self.entries.retain(|entry| entry.id != id);
            self.entries.push(Entry {
                id: id.clone(),
                document: Document {
                    page_content: text.clone(),
                    metadata,
                },
                vector,
            });
            assigned.push(id);
        }
        Ok(assigned)
    }

    /// Add documents, preserving their metadata.
    pub fn add_documents(&mut self, documents: &[Document]) -> Result<Vec<String>, AgentError> {
        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let metadatas: Vec<BTreeMap<String, String>> =
            documents.iter().map(|d| d.metadata.clone()).collect();
        self.add_texts(&texts, Some(&metadatas), None)
    }

    /// Remove entries by id. Returns whether anything was removed.
    pub fn delete(&mut self, ids: &[String]) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| !ids.contains(&entry.id));
        before != self.entries.len()
    }

    /// The `k` most similar documents to a query, by cosine similarity.
    pub fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, AgentError> {
        let query_vector = self.embedder.embed(query)?;
        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vector, &entry.vector), &entry.document))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, document)| document.clone())
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
