//! Scrapyard API Server Binary
//!
//! Boots the rewards ledger and serves the play API.

use clap::Parser;
use scrapyard::api::server::{ApiConfig, ApiServer};
use scrapyard::config::ConfigLoader;
use scrapyard::rng::SystemOutcomes;
use scrapyard::service::PlayService;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "scrapyard")]
#[command(about = "Scrapyard rewards ledger API server", long_about = None)]
struct Args {
    /// API server host
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// API server port
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long, default_value = "*")]
    cors_origins: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrapyard=info,tower_http=info".into()),
        )
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let engine_config = loader.load()?;

    let allowed_origins: Vec<String> = args
        .cors_origins
        .split(',')
        .map(|origin| origin.trim().to_string())
        .collect();

    let api_config = ApiConfig {
        host: args.host,
        port: args.port,
        allowed_origins,
        request_timeout_secs: args.timeout,
        ..Default::default()
    };

    let service = Arc::new(PlayService::new(engine_config, Arc::new(SystemOutcomes)));
    ApiServer::new(api_config, service).run().await
}
