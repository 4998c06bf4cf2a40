//! Embedding service seam.
//!
//! Indexing and retrieval only see the `Embedder` trait. Production traffic
//! goes through `OpenAiEmbedder`; tests plug in in-process fakes.

use async_trait::async_trait;
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiEmbedder;

/// Embedding model used for every index and query.
/// Pinned so that vectors from different requests stay comparable.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding service returned {returned} vectors for {requested} inputs")]
    CountMismatch { requested: usize, returned: usize },

    #[error("invalid embedding client configuration: {0}")]
    Config(String),
}

/// Turns text into fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds every input, returning one vector per input in input order.
    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Identifier of the model producing the vectors.
    fn model(&self) -> &str;

    /// Largest number of inputs accepted by a single `embed` call.
    fn max_batch_size(&self) -> usize {
        64
    }
}
