use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::inference::ImageInput;

/// Language name to generated description, in the order the model first returned each language.
pub type DescriptionMap = IndexMap<String, String>;

#[derive(Serialize, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    /// Only the exact names `Short` and `Long` select those tiers; anything else reads as `Medium`.
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("Short") => Length::Short,
            Some("Long") => Length::Long,
            _ => Length::Medium,
        }
    }

    /// How the verbosity tier is phrased in the instruction.
    pub fn verbosity(&self) -> &'static str {
        match self {
            Length::Short => "concise",
            Length::Medium => "moderately detailed",
            Length::Long => "detailed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image: ImageInput,
    pub languages: Vec<String>,
    pub length: Length,
    /// Model identifier as submitted; `None` means the configured default
    pub model: Option<String>,
}

/// Split the submitted language list on commas. Entries are kept verbatim, whitespace included.
pub fn split_languages(field: &str) -> Vec<String> {
    field.split(',').map(str::to_string).collect()
}

#[derive(Deserialize, Serialize, PartialEq, Debug, Clone)]
pub struct DescriptionItem {
    pub language: String,
    pub description: String,
}

/// Decode a completion as a description array. An empty completion counts as an empty array.
pub fn parse_items(raw: &str) -> Result<Vec<DescriptionItem>, serde_json::Error> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}

#[derive(Serialize, Debug)]
pub struct DescriptionsResponse {
    pub descriptions: DescriptionMap,
}

/// Later items overwrite earlier ones with the same language.
pub fn fold_descriptions(items: Vec<DescriptionItem>) -> DescriptionMap {
    items
        .into_iter()
        .map(|item| (item.language, item.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(language: &str, description: &str) -> DescriptionItem {
        DescriptionItem {
            language: language.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_length_from_field() {
        assert_eq!(Length::from_field(Some("Short")), Length::Short);
        assert_eq!(Length::from_field(Some("Medium")), Length::Medium);
        assert_eq!(Length::from_field(Some("Long")), Length::Long);
        assert_eq!(Length::from_field(Some("short")), Length::Medium);
        assert_eq!(Length::from_field(Some("Huge")), Length::Medium);
        assert_eq!(Length::from_field(None), Length::Medium);
    }

    #[test]
    fn test_length_verbosity() {
        assert_eq!(Length::Short.verbosity(), "concise");
        assert_eq!(Length::Medium.verbosity(), "moderately detailed");
        assert_eq!(Length::Long.verbosity(), "detailed");
    }

    #[test]
    fn test_split_languages_keeps_whitespace_and_duplicates() {
        assert_eq!(
            split_languages("English, French,English"),
            vec!["English", " French", "English"]
        );
        assert_eq!(split_languages(""), vec![""]);
    }

    #[test]
    fn test_parse_items_accepts_array() {
        let items = parse_items(
            r#"[{"language":"English","description":"A sleek widget."},{"language":"French","description":"Un widget élégant."}]"#,
        )
        .unwrap();
        assert_eq!(
            items,
            vec![
                item("English", "A sleek widget."),
                item("French", "Un widget élégant.")
            ]
        );
    }

    #[test]
    fn test_parse_items_empty_is_empty_array() {
        assert!(parse_items("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_items_rejects_whitespace_only() {
        assert!(parse_items("  \n").is_err());
    }

    #[test]
    fn test_parse_items_rejects_surrounding_prose() {
        assert!(parse_items(
            r#"Sure! Here are the descriptions: [{"language":"English","description":"x"}]"#
        )
        .is_err());
    }

    #[test]
    fn test_parse_items_rejects_wrong_shape() {
        assert!(parse_items(r#"{"English":"x"}"#).is_err());
        assert!(parse_items(r#"[{"language":"English"}]"#).is_err());
        assert!(parse_items(r#"[{"language":"English","description":"trunc"#).is_err());
    }

    #[test]
    fn test_fold_last_occurrence_wins() {
        let map = fold_descriptions(vec![
            item("English", "first"),
            item("German", "Deutsch"),
            item("English", "second"),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map["English"], "second");
        assert_eq!(map["German"], "Deutsch");
    }

    #[test]
    fn test_fold_keeps_model_order() {
        let map = fold_descriptions(vec![
            item("Spanish", "uno"),
            item("English", "one"),
            item("Spanish", "dos"),
            item("Chinese", "yi"),
        ]);
        assert_eq!(
            map.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["Spanish", "English", "Chinese"]
        );
        assert_eq!(map["Spanish"], "dos");
        assert_eq!(
            serde_json::to_string(&DescriptionsResponse { descriptions: map }).unwrap(),
            r#"{"descriptions":{"Spanish":"dos","English":"one","Chinese":"yi"}}"#
        );
    }
}
