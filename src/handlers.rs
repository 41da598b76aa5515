use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::types::{BiasResult, Instrument, NewsResponse, SourceHealth};
use crate::{bias, AppState};

/// GET /all-bias - Synthetic bias for every tracked pair
pub async fn get_all_bias() -> Json<BTreeMap<Instrument, BiasResult>> {
    let all = bias::get_all_bias(&mut rand::thread_rng());
    info!("Generated bias for {} instruments", all.len());
    Json(all)
}

/// GET /news - Latest instrument-related articles
///
/// Upstream failures still answer 200, with an `{error, details}` body.
pub async fn get_news(State(state): State<Arc<AppState>>) -> Json<NewsResponse> {
    Json(state.news.get_news().await)
}

/// GET /health - Service health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sources = state.news.health_check().await;
    let all_healthy = sources.iter().all(|h| h.is_healthy);

    Json(HealthResponse {
        status: if all_healthy { "healthy".to_string() } else { "degraded".to_string() },
        version: env!("CARGO_PKG_VERSION").to_string(),
        sources,
    })
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sources: Vec<SourceHealth>,
}
