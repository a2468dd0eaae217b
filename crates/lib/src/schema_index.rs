//! # Schema Index
//!
//! A similarity-searchable index over per-table schema descriptions. It is built
//! once at startup and is read-only afterwards, so it can be shared across
//! concurrent requests behind an `Arc` without locking.
//!
//! If the database cannot be introspected the index still initializes, empty.
//! Retrieval then returns nothing and the pipeline keeps serving requests with no
//! table hints.

use crate::{
    errors::PromptError,
    providers::{ai::EmbeddingProvider, db::storage::Storage},
    types::SchemaDocument,
};
use std::{cmp::Ordering, sync::Arc};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct SchemaIndex {
    documents: Vec<SchemaDocument>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SchemaIndex {
    /// An index with no documents.
    pub fn empty(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            documents: Vec::new(),
            embedder,
        }
    }

    /// Enumerates every usable table, renders and embeds it.
    ///
    /// Introspection failures degrade to an empty index. Embedding failures are
    /// returned to the caller.
    pub async fn build(
        storage: &dyn Storage,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, PromptError> {
        let described = match describe_tables(storage).await {
            Ok(described) => described,
            Err(e) => {
                warn!("Error fetching table info, starting with an empty schema index: {e}");
                return Ok(Self::empty(embedder));
            }
        };

        let texts: Vec<String> = described.iter().map(|(_, text)| text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let documents = described
            .into_iter()
            .zip(embeddings)
            .map(|((table_name, schema_text), embedding)| SchemaDocument {
                table_name,
                schema_text,
                embedding,
            })
            .collect::<Vec<_>>();

        info!("Schema index built with {} tables.", documents.len());
        Ok(Self {
            documents,
            embedder,
        })
    }

    /// Returns the `k` documents nearest to `text`, most similar first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<&SchemaDocument>, PromptError> {
        if self.documents.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(text).await?;
        let ranked = rank_by_similarity(&self.documents, &query_vector, k);
        debug!(
            tables = ?ranked.iter().map(|d| d.table_name.as_str()).collect::<Vec<_>>(),
            "Retrieved relevant schema documents"
        );
        Ok(ranked)
    }

    /// The relevant schema context for a question, as one string.
    pub async fn relevant_schema(&self, text: &str, k: usize) -> Result<String, PromptError> {
        Ok(join_schema_texts(self.query(text, k).await?))
    }

    /// Descriptions for every table, in enumeration order.
    pub fn full_schema(&self) -> String {
        join_schema_texts(self.documents.iter())
    }

    pub fn documents(&self) -> &[SchemaDocument] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

async fn describe_tables(storage: &dyn Storage) -> Result<Vec<(String, String)>, PromptError> {
    let mut described = Vec::new();
    for table_name in storage.list_tables().await? {
        let info = storage.get_table_info(&table_name).await?;
        described.push((table_name, info));
    }
    Ok(described)
}

fn join_schema_texts<'a>(documents: impl IntoIterator<Item = &'a SchemaDocument>) -> String {
    documents
        .into_iter()
        .map(|d| d.schema_text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn rank_by_similarity<'a>(
    documents: &'a [SchemaDocument],
    query_vector: &[f32],
    k: usize,
) -> Vec<&'a SchemaDocument> {
    let mut scored: Vec<(f64, &SchemaDocument)> = documents
        .iter()
        .map(|doc| {
            let score =
                cosine_similarity(&doc.embedding, query_vector).unwrap_or(f64::NEG_INFINITY);
            (score, doc)
        })
        .collect();
    // Stable sort: equal scores keep table enumeration order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().take(k).map(|(_, doc)| doc).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}
