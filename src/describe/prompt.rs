//! Instructions sent to the inference API.

use crate::inference::{ChatMessage, CompletionRequest, ModelSettings};

use super::request::GenerationRequest;

pub const GENERATOR_SYSTEM_PROMPT: &str =
    "You are a helpful product description generator that ONLY responds with JSON.";

pub const REPAIR_SYSTEM_PROMPT: &str =
    "Parse out the valid JSON from this text. Only answer in JSON.";

pub fn describe_instruction(request: &GenerationRequest) -> String {
    let quoted = request
        .languages
        .iter()
        .map(|language| format!("\"{language}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Given this product image, return JSON of a {verbosity} product description in each of these languages: {quoted}\n\
         \n\
         Each description should be in natural paragraph format without bullet points or headers. \
         Focus on key features, benefits, and appeal to customers.\n\
         \n\
         Return a JSON array in the following shape exactly:\n\
         [\n  {{\"language\": \"language name\", \"description\": \"description text\"}},\n  ...\n]\n\
         \n\
         IMPORTANT: You MUST include descriptions for ALL {count} languages I specified.\n\
         PLEASE ONLY RETURN JSON, NOTHING ELSE.",
        verbosity = request.length.verbosity(),
        count = request.languages.len(),
    )
}

pub fn primary_request(request: &GenerationRequest, settings: &ModelSettings) -> CompletionRequest {
    CompletionRequest {
        model: settings
            .resolve_primary(request.model.as_deref())
            .to_string(),
        temperature: Some(settings.temperature),
        messages: vec![
            ChatMessage::system(GENERATOR_SYSTEM_PROMPT),
            ChatMessage::user_with_image(describe_instruction(request), &request.image),
        ],
    }
}

pub fn repair_request(raw_text: &str, settings: &ModelSettings) -> CompletionRequest {
    CompletionRequest {
        model: settings.repair_model.clone(),
        temperature: None,
        messages: vec![
            ChatMessage::system(REPAIR_SYSTEM_PROMPT),
            ChatMessage::user(raw_text),
        ],
    }
}
