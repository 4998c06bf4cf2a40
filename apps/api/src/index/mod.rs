//! In-memory exact vector index.
//!
//! Distance metric: squared Euclidean (L2). Search is a linear scan over every
//! stored vector; indexes here hold one document's chunks and live for a
//! single request.

use thiserror::Error;
use tracing::debug;

use crate::chunking::Chunk;
use crate::embedding::{Embedder, EmbeddingError};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed for chunks {first}..={last}: {source}")]
    Embedding {
        first: usize,
        last: usize,
        #[source]
        source: EmbeddingError,
    },

    #[error("chunk {chunk} embedded to {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        chunk: usize,
        expected: usize,
        actual: usize,
    },

    #[error("chunk {chunk} embedded to an empty vector")]
    EmptyVector { chunk: usize },
}

#[derive(Debug, Clone)]
struct IndexEntry {
    vector: Vec<f32>,
    chunk: Chunk,
}

/// A nearest-neighbour hit. `id` is the chunk's insertion position.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub id: usize,
    pub distance: f32,
    pub chunk: &'a Chunk,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    model: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embeds every chunk and stores the (vector, chunk) pairs.
    ///
    /// All-or-nothing: any embedding failure or malformed vector aborts the
    /// build and no index is returned.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self, IndexError> {
        let batch_size = embedder.max_batch_size().max(1);
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());

        for (batch_no, batch) in chunks.chunks(batch_size).enumerate() {
            let first = batch_no * batch_size;
            let last = first + batch.len() - 1;
            let inputs: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();

            let embedded = embedder
                .embed(&inputs)
                .await
                .map_err(|source| IndexError::Embedding {
                    first,
                    last,
                    source,
                })?;
            if embedded.len() != batch.len() {
                return Err(IndexError::Embedding {
                    first,
                    last,
                    source: EmbeddingError::CountMismatch {
                        requested: batch.len(),
                        returned: embedded.len(),
                    },
                });
            }
            vectors.extend(embedded);
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        for (chunk, vector) in vectors.iter().enumerate() {
            if vector.is_empty() {
                return Err(IndexError::EmptyVector { chunk });
            }
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    chunk,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { vector, chunk })
            .collect();

        debug!(
            "Built vector index: {} chunk(s), dimension {}, model {}",
            entries.len(),
            dimension,
            embedder.model()
        );

        Ok(Self {
            model: embedder.model().to_string(),
            dimension,
            entries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Vector dimension, 0 for an empty index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns up to `k` entries nearest to `query`, nearest first.
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit<'_>> {
        let mut hits: Vec<SearchHit<'_>> = self
            .entries
            .iter()
            .enumerate()
            .map(|(id, entry)| SearchHit {
                id,
                distance: squared_l2(query, &entry.vector),
                chunk: &entry.chunk,
            })
            .collect();

        // Stable sort: ties stay in insertion order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        hits
    }
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering as AtomicOrdering;

    use super::*;
    use crate::chunking::{split_text, ChunkingConfig};
    use crate::embedding::testing::{FailingEmbedder, LetterCountEmbedder, RaggedEmbedder};

    fn chunks_of(texts: &[&str]) -> Vec<Chunk> {
        let mut offset = 0;
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let len = text.chars().count();
                let chunk = Chunk {
                    index,
                    text: text.to_string(),
                    char_start: offset,
                    char_end: offset + len,
                };
                offset += len;
                chunk
            })
            .collect()
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn test_build_records_model_and_dimension() {
        let embedder = LetterCountEmbedder::new();
        let index = VectorIndex::build(chunks_of(&["rust", "python", "go"]), &embedder)
            .await
            .unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 26);
        assert_eq!(index.model(), embedder.model());
    }

    #[tokio::test]
    async fn test_build_batches_by_embedder_limit() {
        let embedder = LetterCountEmbedder::with_batch_size(2);
        let index = VectorIndex::build(chunks_of(&["a", "b", "c", "d", "e"]), &embedder)
            .await
            .unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_chunk_list_builds_empty_index() {
        let embedder = LetterCountEmbedder::new();
        let index = VectorIndex::build(Vec::new(), &embedder).await.unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), 0);
        assert!(index.search(&[1.0; 26], 4).is_empty());
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_embedding_aborts_whole_build() {
        // First batch succeeds, the second fails: no partial index.
        let embedder = FailingEmbedder::new(1);
        let result = VectorIndex::build(chunks_of(&["one", "two", "three"]), &embedder).await;
        match result {
            Err(IndexError::Embedding { first, last, .. }) => {
                assert_eq!((first, last), (1, 1));
            }
            other => panic!("expected embedding failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mismatched_dimensions_are_rejected() {
        let result = VectorIndex::build(chunks_of(&["ab", "abc"]), &RaggedEmbedder).await;
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                chunk: 1,
                expected: 2,
                actual: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_search_orders_nearest_first_and_truncates() {
        let embedder = LetterCountEmbedder::new();
        let index = VectorIndex::build(
            chunks_of(&["zzzz", "rust rust", "rusty", "qqqq qqqq"]),
            &embedder,
        )
        .await
        .unwrap();

        let query = LetterCountEmbedder::vector("rust");
        let hits = index.search(&query, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "rusty");
        assert_eq!(hits[1].chunk.text, "rust rust");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_search_ties_keep_insertion_order() {
        let embedder = LetterCountEmbedder::new();
        let index = VectorIndex::build(chunks_of(&["abc", "cab", "bca", "xyz"]), &embedder)
            .await
            .unwrap();
        let hits = index.search(&LetterCountEmbedder::vector("abc"), 3);
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(hits.iter().all(|h| h.distance == 0.0));
    }

    #[tokio::test]
    async fn test_search_never_exceeds_chunk_count() {
        let embedder = LetterCountEmbedder::new();
        let chunks = split_text(
            &"Built data pipelines in Rust. ".repeat(20),
            &ChunkingConfig::new(200, 20).unwrap(),
        );
        let count = chunks.len();
        let index = VectorIndex::build(chunks, &embedder).await.unwrap();
        let hits = index.search(&LetterCountEmbedder::vector("rust"), count + 10);
        assert_eq!(hits.len(), count);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[tokio::test]
    async fn test_search_with_nan_query_does_not_panic() {
        let embedder = LetterCountEmbedder::new();
        let index = VectorIndex::build(chunks_of(&["rust", "go", "zig"]), &embedder)
            .await
            .unwrap();
        let hits = index.search(&[f32::NAN; 26], 2);
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
