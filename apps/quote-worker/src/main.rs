//! Quote Worker
//!
//! Receives object-finalized notifications for uploaded venue quote images,
//! runs OCR on each upload and records the parsed estimates on a job record.
//!
//! - `POST /api/storage/finalized` runs the pipeline for one upload
//! - `GET /api/jobs/:date/:job_id` returns the job record

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use ocr_jobs::{SqliteJobStore, SystemClock, VisionOcrClient, WorkerConfig, DEFAULT_VISION_ENDPOINT};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod state;

use api::{handle_get_job, handle_health, handle_storage_finalized};
use state::AppState;

/// Command-line arguments for the quote worker
#[derive(Parser, Debug)]
#[command(name = "quote-worker")]
#[command(about = "OCR worker for uploaded venue quote images")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Worker configuration file (TOML)
    #[arg(short, long, env = "QUOTE_WORKER_CONFIG")]
    config: Option<PathBuf>,

    /// Job store database
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:quote-worker.db?mode=rwc")]
    database_url: String,

    /// Directory holding uploaded objects as `{bucket}/{path}`
    #[arg(long, env = "STORAGE_ROOT", default_value = "./storage")]
    storage_root: PathBuf,

    /// Vision annotate endpoint
    #[arg(long, env = "VISION_ENDPOINT", default_value = DEFAULT_VISION_ENDPOINT)]
    vision_endpoint: String,

    /// Vision API key
    #[arg(long, env = "VISION_API_KEY", hide_env_values = true)]
    vision_api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Storage trigger
        .route("/api/storage/finalized", post(handle_storage_finalized))
        // Job records
        .route("/api/jobs/:date/:job_id", get(handle_get_job))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => WorkerConfig::from_file(path)?,
        None => WorkerConfig::default(),
    };

    let store = SqliteJobStore::connect(&args.database_url)
        .await
        .context("Failed to open job store")?;

    let mut ocr = VisionOcrClient::new(&args.storage_root).with_endpoint(&args.vision_endpoint);
    if let Some(key) = &args.vision_api_key {
        ocr = ocr.with_api_key(key);
    }

    let state = Arc::new(AppState::new(
        &config,
        Arc::new(store),
        Arc::new(ocr),
        Arc::new(SystemClock),
    ));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Quote worker listening on http://{}", addr);
    info!("Storage root: {}", args.storage_root.display());
    info!("Lease: {}ms, upload prefix: {}", config.lease_ms, config.upload_prefix);

    axum::serve(listener, router(state)).await?;

    Ok(())
}
