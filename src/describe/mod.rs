//! Product description generation: request model, prompts and the generate/repair pipeline.

pub(crate) mod generator;
pub(crate) mod options;
pub(crate) mod prompt;
pub(crate) mod request;

pub use generator::DescriptionGenerator;
pub use options::OptionCatalog;
pub use request::{split_languages, DescriptionsResponse, GenerationRequest, Length};
