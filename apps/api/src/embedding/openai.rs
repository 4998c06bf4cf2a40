//! OpenAI-compatible `/embeddings` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbeddingError, EMBEDDING_MODEL};

const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::Config("missing API key".to_string()));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| EmbeddingError::Config("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: EMBEDDING_MODEL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != inputs.len() {
            return Err(EmbeddingError::CountMismatch {
                requested: inputs.len(),
                returned: parsed.data.len(),
            });
        }
        parsed.data.sort_by_key(|entry| entry.index);

        debug!(
            "Embedded {} input(s) with {}",
            inputs.len(),
            self.model
        );
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder_for(server: &mockito::Server) -> OpenAiEmbedder {
        OpenAiEmbedder::new("sk-test", &server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = OpenAiEmbedder::new("  ", "http://localhost", Duration::from_secs(1));
        assert!(matches!(result, Err(EmbeddingError::Config(_))));
    }

    #[tokio::test]
    async fn test_embed_reorders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": EMBEDDING_MODEL,
                "input": ["first", "second"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [
                    {"embedding": [0.0, 1.0], "index": 1},
                    {"embedding": [1.0, 0.0], "index": 0}
                ]}"#,
            )
            .create_async()
            .await;

        let vectors = embedder_for(&server)
            .embed(&["first", "second"])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_surfaces_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = embedder_for(&server).embed(&["text"]).await.unwrap_err();
        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_rejects_short_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"embedding": [1.0], "index": 0}]}"#)
            .create_async()
            .await;

        let err = embedder_for(&server).embed(&["a", "b"]).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                requested: 2,
                returned: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let server = mockito::Server::new_async().await;
        let vectors = embedder_for(&server).embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
