use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::describe::{
    split_languages, DescriptionGenerator, DescriptionsResponse, GenerationRequest, Length,
    OptionCatalog,
};
use crate::inference::together::DEFAULT_ENDPOINT;
use crate::inference::{ImageInput, ModelSettings, TogetherClient};

#[allow(dead_code)]
#[path = "../describe/mod.rs"]
mod describe;

#[allow(dead_code)]
#[path = "../inference/mod.rs"]
mod inference;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate descriptions for a local product image
    Describe {
        /// Path to the product image
        #[clap(short, long)]
        image: PathBuf,

        /// Comma-separated language names
        #[clap(short, long, default_value = "English")]
        languages: String,

        /// Short, Medium or Long
        #[clap(long)]
        length: Option<String>,

        /// Vision model identifier
        #[clap(short, long)]
        model: Option<String>,

        /// API key for the inference API
        #[clap(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Chat-completions endpoint of the inference API
        #[clap(long, env, default_value = DEFAULT_ENDPOINT)]
        inference_endpoint: String,
    },
    /// Print the models, languages and lengths offered by the service
    Options,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match args.cmd {
        Commands::Describe {
            image,
            languages,
            length,
            model,
            api_key,
            inference_endpoint,
        } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            if bytes.is_empty() {
                bail!("No image provided");
            }

            let request = GenerationRequest {
                image: ImageInput::new(bytes, media_type_for(&image)),
                languages: split_languages(&languages),
                length: Length::from_field(length.as_deref()),
                model,
            };
            let client = TogetherClient::new(&api_key, &inference_endpoint);
            let generator = DescriptionGenerator::new(Arc::new(client), ModelSettings::default());

            let descriptions = generator.generate(&request).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&DescriptionsResponse { descriptions })?
            );
        }
        Commands::Options => {
            let catalog = OptionCatalog::new(&ModelSettings::default());
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }
    Ok(())
}

fn media_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
