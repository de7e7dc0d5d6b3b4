//! Chat-completion capability consumed by the description pipeline.
//!
//! The pipeline only ever needs one operation, `complete`, so the hosted API
//! sits behind a small trait that tests can replace with a scripted fake.

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset)
    #[error("Inference request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("Inference API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response envelope was not the expected chat-completion shape
    #[error("Failed to decode inference response: {0}")]
    Decode(String),
}

#[derive(Serialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Serialize, PartialEq, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Serialize, PartialEq, Clone, Debug)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying an instruction followed by an image reference.
    pub fn user_with_image(text: impl Into<String>, image: &ImageInput) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    /// `None` leaves sampling to the provider default
    pub temperature: Option<f32>,
    pub messages: Vec<ChatMessage>,
}

/// Uploaded image bytes plus the media type used to label them.
#[derive(Clone, Debug)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

impl ImageInput {
    /// Keeps the declared content type when it names an image, otherwise labels the bytes as JPEG.
    pub fn new(bytes: Vec<u8>, declared_type: Option<&str>) -> Self {
        let media_type = match declared_type {
            Some(content_type) if content_type.starts_with("image/") => content_type.to_string(),
            _ => FALLBACK_MEDIA_TYPE.to_string(),
        };
        Self { bytes, media_type }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            Base64::encode_string(&self.bytes)
        )
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Run one chat completion and return the first choice's raw text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError>;
}
