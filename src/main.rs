use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn, Level};

use forex_pulse::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting Forex Pulse...");

    if dotenvy::dotenv().is_ok() {
        info!("✓ Loaded .env");
    }

    let settings = Settings::load().context("Failed to load configuration")?;
    if !settings.has_api_key() {
        warn!("⚠ FOREX_PULSE_NEWSAPI_KEY is not set, /news will report provider errors");
    }

    let state = AppState::from_settings(&settings).context("Failed to initialize news source")?;
    info!(
        "✓ NewsAPI client initialized ({}s timeout, {} articles max)",
        settings.request_timeout_secs, settings.max_articles
    );

    let app = forex_pulse::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr()))?;
    info!("🚀 Forex Pulse listening on {}", settings.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
