use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use clap_serde_derive::ClapSerde;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::describe::{DescriptionGenerator, DescriptionsResponse, OptionCatalog};
use crate::error::{ApiError, ApiResult};
use crate::extractors::GenerationForm;
use crate::inference::TogetherClient;

mod config;
mod describe;
mod error;
mod extractors;
mod inference;
mod telemetry;

#[macro_export]
macro_rules! exit_err {
    ($code:expr, $($arg:tt)+) => {{
        tracing::error!($($arg)+);
        std::process::exit($code);
    }};
}

#[cfg(unix)]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_CONFIG_FILE: &str = "ProductDescriber.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) generator: Arc<DescriptionGenerator>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(conf) => conf.merge(args.opt_config),
        Err(err) => {
            if args.config_file == DEFAULT_CONFIG_FILE {
                Config::default().merge(args.opt_config)
            } else {
                telemetry::init_telemetry(None, true)?;
                exit_err!(
                    1,
                    "Failed to read configuration file {} with error: {}",
                    args.config_file,
                    err
                );
            }
        }
    };

    telemetry::init_telemetry(config.otlp_endpoint(), config.console)?;
    if let Err(err) = config.validate() {
        exit_err!(1, "Invalid configuration: {:#}", err);
    }

    let client = TogetherClient::new(&config.api_key, &config.inference_endpoint);
    let generator = DescriptionGenerator::new(Arc::new(client), config.model_settings());
    let state = AppState {
        generator: Arc::new(generator),
    };
    let router = app(state, config.body_limit);

    let addr: SocketAddr = format!("{}:{}", config.address, config.port).parse()?;
    match config.tls_paths() {
        Some((cert, key)) => {
            let tls_config = RustlsConfig::from_pem_file(cert, key).await?;
            let handle = axum_server::Handle::new();
            tokio::spawn(shutdown_on_signal(handle.clone()));
            info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            info!("Listening on http://{}", listener.local_addr()?);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}

pub(crate) fn app(state: AppState, body_limit: usize) -> Router {
    let api_router = Router::new()
        .route("/generate-descriptions", post(handle_generate_descriptions))
        .route("/options", get(handle_options))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .nest("/api", api_router)
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

async fn shutdown_on_signal(handle: axum_server::Handle) {
    shutdown_signal().await;
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}

#[axum_macros::debug_handler]
async fn handle_generate_descriptions(
    State(state): State<AppState>,
    GenerationForm(request): GenerationForm,
) -> ApiResult<Json<DescriptionsResponse>> {
    let descriptions = state.generator.generate(&request).await.map_err(|err| {
        error!(error = %err, "Failed to generate descriptions");
        ApiError::generation_failed()
    })?;
    Ok(Json(DescriptionsResponse { descriptions }))
}

#[axum_macros::debug_handler]
async fn handle_options(State(state): State<AppState>) -> Json<OptionCatalog> {
    Json(OptionCatalog::new(state.generator.settings()))
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
