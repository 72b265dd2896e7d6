use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use forecast_summary::{AppState, ForecastConfig, telemetry, web};

/// Serve natural-language summaries of multi-day weather forecasts
#[derive(Debug, Parser)]
#[command(name = "forecast-summary", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let mut config = ForecastConfig::load_from_path(cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging, &config.telemetry)?;

    tracing::info!("Starting forecast-summary {}", forecast_summary::VERSION);
    tracing::info!(
        "Weather API: {}, LLM: {:?} ({})",
        config.weather.base_url,
        config.llm.provider,
        config.llm.model
    );
    if config.llm.api_key.is_none() {
        tracing::warn!(
            "{} is not set; forecast requests will fail until it is provided",
            config.llm.provider.credential_variable()
        );
    }

    let state = AppState::from_config(&config)?;
    web::run(state, &config.server).await
}
