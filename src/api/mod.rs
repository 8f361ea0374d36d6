//! OpenAI-compatible HTTP clients for embeddings and chat completions

use crate::domain::Config;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub mod chat;
pub mod embeddings;

pub use chat::{ChatClient, OpenAiChatClient};
pub use embeddings::{EmbeddingClient, OpenAiEmbeddingClient};

/// Env var holding the API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Env var overriding the configured API base URL.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status { endpoint: String, status: StatusCode, body: String },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// Connection details shared by both clients.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), api_key: api_key.into() }
    }

    /// Read the key from `OPENAI_API_KEY`; `OPENAI_BASE_URL` wins over the config.
    pub fn from_env(config: &Config) -> Result<Self, ApiError> {
        let api_key = env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ApiError::MissingApiKey(ENV_API_KEY))?;
        let base_url = env::var(ENV_BASE_URL)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| config.api_base_url.clone());
        Ok(Self::new(base_url, api_key))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// HTTP client with a per-request timeout applied to every call.
pub fn build_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder().timeout(timeout).build().map_err(ApiError::Client)
}

/// POST `body` as JSON and decode a JSON reply.
pub(crate) async fn post_json<Req, Resp>(
    client: &Client,
    settings: &ApiSettings,
    path: &str,
    body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let endpoint = settings.endpoint(path);
    let response = client
        .post(&endpoint)
        .bearer_auth(&settings.api_key)
        .json(body)
        .send()
        .await
        .map_err(|source| request_error(&endpoint, source))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::Status { endpoint, status, body });
    }

    let bytes = response.bytes().await.map_err(|source| request_error(&endpoint, source))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::Malformed { endpoint, reason: err.to_string() })
}

fn request_error(endpoint: &str, source: reqwest::Error) -> ApiError {
    if source.is_timeout() {
        ApiError::Timeout { endpoint: endpoint.to_string() }
    } else {
        ApiError::Request { endpoint: endpoint.to_string(), source }
    }
}
