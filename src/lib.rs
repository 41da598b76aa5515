pub mod types;
pub mod sources {
    pub mod newsapi;
}
pub mod aggregators;
pub mod bias;
pub mod config;
pub mod filter;
pub mod handlers;

pub use types::*;
pub use aggregators::NewsAggregator;
pub use config::{Settings, TagTable};
pub use sources::newsapi::NewsApiClient;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState {
    pub news: NewsAggregator,
}

impl AppState {
    /// Wire the NewsAPI-backed aggregator from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = NewsApiClient::new(settings)?;
        Ok(Self {
            news: NewsAggregator::new(Arc::new(client), TagTable::default(), settings.max_articles),
        })
    }
}

/// Build the service router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/all-bias", get(handlers::get_all_bias))
        .route("/news", get(handlers::get_news))
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
