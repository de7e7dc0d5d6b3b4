//! Together AI chat-completions client.
//!
//! Speaks the OpenAI-compatible wire format; image parts travel as data URLs.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{ChatMessage, CompletionRequest, InferenceClient, InferenceError};

pub const DEFAULT_ENDPOINT: &str = "https://api.together.xyz/v1/chat/completions";

pub struct TogetherClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl TogetherClient {
    pub fn new(api_key: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice; a missing choice or null content reads as empty.
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceClient for TogetherClient {
    fn name(&self) -> &str {
        "together"
    }

    #[tracing::instrument(level = "info", skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
        let start = Instant::now();
        let body = ChatRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: &request.messages,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        let text = chat_resp.into_text();

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Completion received"
        );
        Ok(text)
    }
}
