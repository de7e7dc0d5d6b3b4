pub(crate) mod client;
#[cfg(test)]
pub(crate) mod fake;
pub(crate) mod model_config;
pub(crate) mod together;

pub use client::{ChatMessage, CompletionRequest, ImageInput, InferenceClient, InferenceError};
pub use model_config::{ModelSettings, VisionModel};
pub use together::TogetherClient;
