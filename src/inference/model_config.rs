use serde::Serialize;

/// Sampling temperature for the primary call; low to keep the output structured.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Text-only model asked to pull valid JSON out of a malformed primary answer.
pub const DEFAULT_REPAIR_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo";

/// Vision models the service knows about and offers to clients.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum VisionModel {
    #[default]
    Llama32Vision11B,
    Llama32Vision90B,
}

impl VisionModel {
    pub const ALL: [VisionModel; 2] = [VisionModel::Llama32Vision11B, VisionModel::Llama32Vision90B];

    pub fn id(&self) -> &'static str {
        match self {
            VisionModel::Llama32Vision11B => "meta-llama/Llama-3.2-11B-Vision-Instruct-Turbo",
            VisionModel::Llama32Vision90B => "meta-llama/Llama-3.2-90B-Vision-Instruct-Turbo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VisionModel::Llama32Vision11B => "Llama 3.2 11B Vision",
            VisionModel::Llama32Vision90B => "Llama 3.2 90B Vision",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.id() == id)
    }
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct ModelOption {
    pub id: String,
    pub name: String,
    pub default: bool,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Used when a request does not name a model
    pub primary_model: String,
    pub repair_model: String,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            primary_model: VisionModel::default().id().to_string(),
            repair_model: DEFAULT_REPAIR_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ModelSettings {
    /// Pick the model for the primary call. Identifiers outside the catalog are forwarded as given.
    pub fn resolve_primary<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(id) if !id.is_empty() => {
                if VisionModel::from_id(id).is_none() {
                    tracing::debug!(model = id, "Forwarding unrecognized model identifier");
                }
                id
            }
            _ => self.primary_model.as_str(),
        }
    }

    pub fn options(&self) -> Vec<ModelOption> {
        let mut options: Vec<ModelOption> = VisionModel::ALL
            .iter()
            .map(|model| ModelOption {
                id: model.id().to_string(),
                name: model.display_name().to_string(),
                default: model.id() == self.primary_model,
            })
            .collect();
        if VisionModel::from_id(&self.primary_model).is_none() {
            options.insert(
                0,
                ModelOption {
                    id: self.primary_model.clone(),
                    name: self.primary_model.clone(),
                    default: true,
                },
            );
        }
        options
    }
}
