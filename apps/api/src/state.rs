use std::sync::Arc;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Embedding backend for indexing and query embedding. Default: OpenAiEmbedder.
    pub embedder: Arc<dyn Embedder>,
    /// Chat completion backend. Default: LlmClient.
    pub llm: Arc<dyn ChatModel>,
    pub config: Config,
}
