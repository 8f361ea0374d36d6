use crate::api::{post_json, ApiError, ApiSettings};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const CHAT_PATH: &str = "chat/completions";

/// Sends a single-turn prompt to a chat model.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError>;
}

/// Client for the `/chat/completions` endpoint.
pub struct OpenAiChatClient {
    client: Client,
    settings: ApiSettings,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(client: Client, settings: ApiSettings, model: impl Into<String>) -> Self {
        Self { client, settings, model: model.into() }
    }
}

/// Request payload sent to the chat completion API.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Null when the model refused or only produced tool calls
    content: Option<String>,
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        // The whole prompt travels as one user message; some reasoning models
        // reject system messages.
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };
        let response: ChatResponse =
            post_json(&self.client, &self.settings, CHAT_PATH, &request).await?;

        response.choices.into_iter().next().and_then(|choice| choice.message.content).ok_or_else(
            || ApiError::Malformed {
                endpoint: self.settings.endpoint(CHAT_PATH),
                reason: "response contained no message content".to_string(),
            },
        )
    }
}
