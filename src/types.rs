use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracked instruments, in iteration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Instrument {
    #[serde(rename = "EUR/USD")]
    EurUsd,
    #[serde(rename = "GBP/USD")]
    GbpUsd,
    #[serde(rename = "USD/JPY")]
    UsdJpy,
    #[serde(rename = "XAU/USD")]
    XauUsd,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::EurUsd,
        Instrument::GbpUsd,
        Instrument::UsdJpy,
        Instrument::XauUsd,
    ];

    /// Display pair, e.g. "EUR/USD"
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::EurUsd => "EUR/USD",
            Instrument::GbpUsd => "GBP/USD",
            Instrument::UsdJpy => "USD/JPY",
            Instrument::XauUsd => "XAU/USD",
        }
    }

    /// Compact symbol used in provider search queries
    pub fn symbol(&self) -> &'static str {
        match self {
            Instrument::EurUsd => "EURUSD",
            Instrument::GbpUsd => "GBPUSD",
            Instrument::UsdJpy => "USDJPY",
            Instrument::XauUsd => "XAUUSD",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional bias label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    /// Fixed rationale attached to every bias in this direction
    pub fn reasons(&self) -> [&'static str; 3] {
        match self {
            Direction::Bullish => [
                "Strong economic data",
                "Positive sentiment",
                "Risk appetite rising",
            ],
            Direction::Bearish => [
                "Weak economic outlook",
                "Safe haven demand",
                "Risk-off sentiment",
            ],
        }
    }
}

/// Synthetic bias for one instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasResult {
    pub bias: Direction,
    pub score: f64, // -1.0 to 1.0, two decimals
    pub reasons: [&'static str; 3],
}

/// Article as returned by the news provider
///
/// Every field is optional: the provider omits or nulls them freely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Article shaped for the `/news` response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredArticle {
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub datetime: String,
    pub currencies: Vec<Instrument>,
}

/// Body of `GET /news`: either the filtered list or an error payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NewsResponse {
    Articles(Vec<FilteredArticle>),
    Failed { error: String, details: String },
}

/// Data source health/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source: String,
    pub is_healthy: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate: f64,
    pub avg_latency_ms: u64,
}

/// Error types for news retrieval
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("Provider returned {status}")]
    Upstream { status: u16, body: String },

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl NewsError {
    /// Diagnostic text for the error payload: the raw provider body when
    /// there is one, otherwise the error message.
    pub fn details(&self) -> String {
        match self {
            NewsError::Upstream { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for news operations
pub type Result<T> = std::result::Result<T, NewsError>;

/// Trait for news article sources
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch the latest articles, most recent first
    async fn fetch_articles(&self) -> Result<Vec<RawArticle>>;

    /// Get source health status
    async fn health(&self) -> SourceHealth;

    /// Source name
    fn name(&self) -> &str;
}
