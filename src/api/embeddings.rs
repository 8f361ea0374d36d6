use crate::api::{post_json, ApiError, ApiSettings};
use crate::domain::EmbeddingVector;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const EMBEDDINGS_PATH: &str = "embeddings";

/// Turns text into an embedding vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ApiError>;
}

/// Client for the `/embeddings` endpoint.
pub struct OpenAiEmbeddingClient {
    client: Client,
    settings: ApiSettings,
    model: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(client: Client, settings: ApiSettings, model: impl Into<String>) -> Self {
        Self { client, settings, model: model.into() }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: EmbeddingVector,
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ApiError> {
        let request = EmbeddingRequest { model: &self.model, input: text };
        let response: EmbeddingResponse =
            post_json(&self.client, &self.settings, EMBEDDINGS_PATH, &request).await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| ApiError::Malformed {
                endpoint: self.settings.endpoint(EMBEDDINGS_PATH),
                reason: "response contained no embeddings".to_string(),
            })?;

        if embedding.is_empty() {
            return Err(ApiError::Malformed {
                endpoint: self.settings.endpoint(EMBEDDINGS_PATH),
                reason: "embedding vector is empty".to_string(),
            });
        }
        Ok(embedding)
    }
}
