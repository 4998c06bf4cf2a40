//! Top-K retrieval over a per-document `VectorIndex`.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::embedding::{Embedder, EmbeddingError};
use crate::index::VectorIndex;

pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("index was built with model '{index_model}' but query embedder uses '{query_model}'")]
    ModelMismatch {
        index_model: String,
        query_model: String,
    },

    #[error("query embedding failed: {0}")]
    Embedding(#[source] EmbeddingError),

    #[error("query embedded to {actual} dimensions, index has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub chunk_index: usize,
    pub text: String,
    pub distance: f32,
}

/// Chunks ranked by distance to the query, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub chunks: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk texts in rank order joined by a single space.
    pub fn context(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct Retriever<'a> {
    index: &'a VectorIndex,
    embedder: &'a dyn Embedder,
    top_k: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a VectorIndex, embedder: &'a dyn Embedder, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    /// Embeds `query` with the index's model and returns the `top_k` nearest
    /// chunks. Fewer are returned only when the index holds fewer chunks.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        if self.embedder.model() != self.index.model() {
            return Err(RetrievalError::ModelMismatch {
                index_model: self.index.model().to_string(),
                query_model: self.embedder.model().to_string(),
            });
        }
        if self.index.is_empty() {
            return Ok(RetrievalResult::default());
        }

        let query_vector = self
            .embedder
            .embed(&[query])
            .await
            .map_err(RetrievalError::Embedding)?
            .into_iter()
            .next()
            .ok_or(RetrievalError::Embedding(EmbeddingError::CountMismatch {
                requested: 1,
                returned: 0,
            }))?;

        if query_vector.len() != self.index.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: query_vector.len(),
            });
        }

        let chunks: Vec<RetrievedChunk> = self
            .index
            .search(&query_vector, self.top_k)
            .into_iter()
            .map(|hit| RetrievedChunk {
                chunk_index: hit.chunk.index,
                text: hit.chunk.text.clone(),
                distance: hit.distance,
            })
            .collect();

        debug!(
            "Retrieved {} of {} chunk(s) (k={})",
            chunks.len(),
            self.index.len(),
            self.top_k
        );
        Ok(RetrievalResult { chunks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::embedding::testing::{FailingEmbedder, LetterCountEmbedder};

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            index,
            text: text.to_string(),
            char_start: 0,
            char_end: text.chars().count(),
        }
    }

    async fn index_of(texts: &[&str], embedder: &dyn Embedder) -> VectorIndex {
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(i, t)| chunk(i, t))
            .collect();
        VectorIndex::build(chunks, embedder).await.unwrap()
    }

    #[tokio::test]
    async fn test_three_chunks_with_k_four_returns_three() {
        let embedder = LetterCountEmbedder::new();
        let index = index_of(&["kubernetes", "rust async", "sql tuning"], &embedder).await;
        let result = Retriever::new(&index, &embedder, 4)
            .retrieve("rust engineer")
            .await
            .unwrap();
        assert_eq!(result.len(), 3);
        for pair in result.chunks.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[tokio::test]
    async fn test_returns_k_nearest_in_order() {
        let embedder = LetterCountEmbedder::new();
        let index = index_of(
            &["zzzz zzzz", "rust", "rust rust", "qqqq", "rusty", "xxxx"],
            &embedder,
        )
        .await;
        let result = Retriever::new(&index, &embedder, DEFAULT_TOP_K)
            .retrieve("rust")
            .await
            .unwrap();
        let texts: Vec<&str> = result.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["rust", "rusty", "rust rust", "qqqq"]);
        assert_eq!(result.context(), "rust rusty rust rust qqqq");
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_context() {
        let embedder = LetterCountEmbedder::new();
        let index = index_of(&[], &embedder).await;
        let result = Retriever::new(&index, &embedder, 4)
            .retrieve("anything")
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.context(), "");
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let embedder = LetterCountEmbedder::new();
        let index = index_of(&["rust"], &embedder).await;
        let err = Retriever::new(&index, &embedder, 4)
            .retrieve("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_query_with_different_model_is_rejected() {
        let builder = LetterCountEmbedder::new();
        let index = index_of(&["rust"], &builder).await;
        let other = LetterCountEmbedder::with_model("some-other-model");
        let err = Retriever::new(&index, &other, 4)
            .retrieve("rust")
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::ModelMismatch { .. }));
    }

    #[tokio::test]
    async fn test_query_embedding_failure_is_surfaced() {
        // Index build uses the first call; the query call fails.
        let embedder = FailingEmbedder::new(1);
        let index = index_of(&["rust"], &embedder).await;
        let err = Retriever::new(&index, &embedder, 4)
            .retrieve("rust")
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Embedding(_)));
    }
}
