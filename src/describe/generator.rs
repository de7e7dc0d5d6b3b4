//! The generate-then-repair pipeline.
//!
//! A request moves through at most two inference calls:
//!
//! ```text
//! Generate --parsed--> Done
//!     |
//!     +--unparseable or call error--> Repair --parsed--> Done
//!                                        |
//!                                        +--otherwise--> Failed
//! ```
//!
//! Repair never leads back to Repair, so the fallback runs at most once.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::inference::{InferenceClient, InferenceError, ModelSettings};

use super::prompt::{primary_request, repair_request};
use super::request::{fold_descriptions, parse_items, DescriptionItem, DescriptionMap, GenerationRequest};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Repair call failed: {0}")]
    RepairCall(#[source] InferenceError),

    #[error("Repair output is not a description array: {0}")]
    RepairParse(#[source] serde_json::Error),
}

enum Stage {
    Generate,
    Repair { raw_text: String },
    Done(Vec<DescriptionItem>),
}

pub struct DescriptionGenerator {
    client: Arc<dyn InferenceClient>,
    settings: ModelSettings,
}

impl DescriptionGenerator {
    pub fn new(client: Arc<dyn InferenceClient>, settings: ModelSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(languages = request.languages.len(), length = ?request.length)
    )]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<DescriptionMap, GenerationError> {
        let mut stage = Stage::Generate;
        let items = loop {
            stage = match stage {
                Stage::Generate => self.attempt(request).await,
                Stage::Repair { raw_text } => self.repair(&raw_text).await?,
                Stage::Done(items) => break items,
            };
        };

        let descriptions = fold_descriptions(items);
        report_missing_languages(&request.languages, &descriptions);
        Ok(descriptions)
    }

    async fn attempt(&self, request: &GenerationRequest) -> Stage {
        let completion = primary_request(request, &self.settings);
        match self.client.complete(&completion).await {
            Ok(raw_text) => match parse_items(&raw_text) {
                Ok(items) => Stage::Done(items),
                Err(e) => {
                    warn!(error = %e, "Primary completion is not a description array, requesting repair");
                    Stage::Repair { raw_text }
                }
            },
            Err(e) => {
                warn!(
                    provider = self.client.name(),
                    model = %completion.model,
                    error = %e,
                    "Primary completion failed, requesting repair"
                );
                Stage::Repair {
                    raw_text: String::new(),
                }
            }
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(model = %self.settings.repair_model))]
    async fn repair(&self, raw_text: &str) -> Result<Stage, GenerationError> {
        let completion = repair_request(raw_text, &self.settings);
        let repaired = self
            .client
            .complete(&completion)
            .await
            .map_err(GenerationError::RepairCall)?;
        let items = parse_items(&repaired).map_err(GenerationError::RepairParse)?;
        debug!(items = items.len(), "Repair produced a description array");
        Ok(Stage::Done(items))
    }
}

fn report_missing_languages(requested: &[String], descriptions: &DescriptionMap) {
    let missing: Vec<&str> = requested
        .iter()
        .filter(|language| !descriptions.contains_key(language.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        warn!(?missing, returned = descriptions.len(), "Model skipped requested languages");
    }
}
