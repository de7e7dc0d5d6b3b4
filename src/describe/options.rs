use serde::Serialize;

use crate::inference::model_config::ModelOption;
use crate::inference::ModelSettings;

use super::request::Length;

/// Languages offered to clients. Requests are not limited to these.
pub const LANGUAGE_OPTIONS: [&str; 9] = [
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Japanese",
    "Korean",
    "Chinese",
    "Portuguese",
];

#[derive(Serialize, Debug)]
pub struct OptionCatalog {
    pub models: Vec<ModelOption>,
    pub languages: Vec<&'static str>,
    pub lengths: Vec<Length>,
}

impl OptionCatalog {
    pub fn new(settings: &ModelSettings) -> Self {
        Self {
            models: settings.options(),
            languages: LANGUAGE_OPTIONS.to_vec(),
            lengths: Length::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_catalog_serialization() {
        let value = serde_json::to_value(OptionCatalog::new(&ModelSettings::default())).unwrap();
        assert_eq!(value["lengths"], json!(["Short", "Medium", "Long"]));
        assert_eq!(value["languages"][0], "English");
        assert_eq!(value["languages"].as_array().unwrap().len(), 9);
        assert_eq!(
            value["models"][0],
            json!({
                "id": "meta-llama/Llama-3.2-11B-Vision-Instruct-Turbo",
                "name": "Llama 3.2 11B Vision",
                "default": true
            })
        );
    }
}
