//! Sign Classifier Prediction Server
//!
//! Loads the trained model once at start-up and answers `POST /predict`
//! for the browser client.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use signlang::utils::logging::{init_logging, LogConfig};
use signlang_server::{build_router, AppState, ServerConfig};

/// Sign Classifier Prediction Server
#[derive(Parser, Debug)]
#[command(name = "signlang-server")]
#[command(version)]
#[command(about = "HTTP prediction server for the hand-landmark sign classifier")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "SIGNLANG_PORT", default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "SIGNLANG_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory written by `signlang train`
    #[arg(short, long, env = "SIGNLANG_ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts: PathBuf,

    /// Weights file (defaults to `<artifacts>/model.mpk`)
    #[arg(long, env = "SIGNLANG_MODEL")]
    model: Option<PathBuf>,

    /// Architecture file (defaults to `<artifacts>/model_config.json`)
    #[arg(long, env = "SIGNLANG_MODEL_CONFIG")]
    model_config: Option<PathBuf>,

    /// Label file (defaults to `<artifacts>/label_classes.json`)
    #[arg(long, env = "SIGNLANG_LABELS")]
    labels: Option<PathBuf>,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            artifacts_dir: cli.artifacts,
            model_path: cli.model,
            config_path: cli.model_config,
            labels_path: cli.labels,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(Cli::parse());

    init_logging(&LogConfig::default()).map_err(anyhow::Error::msg)?;

    info!("Sign classifier server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Model:   {:?}", config.resolved_model_path());
    info!("  Config:  {:?}", config.resolved_config_path());
    info!("  Labels:  {:?}", config.resolved_labels_path());

    let state = AppState::load(&config).context("Failed to load model artifacts")?;
    info!("Loaded {} classes: {:?}", state.labels.len(), state.labels);

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
