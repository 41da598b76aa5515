use crate::config::Settings;
use crate::types::*;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Internal health tracking, fed by real provider calls
struct HealthTracker {
    /// Timestamp of last successful request (millis since epoch)
    last_success_ms: AtomicU64,
    /// Timestamp of last failed request (millis since epoch)
    last_failure_ms: AtomicU64,
    /// Successful requests since startup
    success_count: AtomicU64,
    /// Failed requests since startup
    failure_count: AtomicU64,
    /// Last known latency in ms
    last_latency_ms: AtomicU64,
}

impl HealthTracker {
    fn new() -> Self {
        Self {
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            last_latency_ms: AtomicU64::new(0),
        }
    }

    fn record_success(&self, latency_ms: u64) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_success_ms.store(now_ms, Ordering::Relaxed);
        self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_failure_ms.store(now_ms, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Healthy until a failure is more recent than the last success
    fn is_healthy(&self) -> bool {
        let last_success = self.last_success_ms.load(Ordering::Relaxed);
        let last_failure = self.last_failure_ms.load(Ordering::Relaxed);
        last_failure == 0 || last_success >= last_failure
    }

    fn success_rate(&self) -> f64 {
        let successes = self.success_count.load(Ordering::Relaxed);
        let failures = self.failure_count.load(Ordering::Relaxed);
        let total = successes + failures;
        if total == 0 {
            return 1.0; // No requests yet, assume healthy
        }
        successes as f64 / total as f64
    }
}

/// NewsAPI `/everything` client
/// Docs: https://newsapi.org/docs/endpoints/everything
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    timeout: Duration,
    health_tracker: HealthTracker,
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

impl NewsApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = settings.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| NewsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.newsapi_base_url.trim_end_matches('/').to_string(),
            api_key: settings.newsapi_key.clone(),
            language: settings.language.clone(),
            timeout,
            health_tracker: HealthTracker::new(),
        })
    }

    /// Provider search query: every instrument symbol OR-ed together
    pub fn query() -> String {
        Instrument::ALL
            .iter()
            .map(|i| i.symbol())
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        let url = format!("{}/everything", self.base_url);
        debug!(
            "GET {}?q={}&language={}&sortBy=publishedAt&apiKey=<redacted>",
            url,
            Self::query(),
            self.language
        );

        self.client.get(&url).query(&[
            ("q", Self::query().as_str()),
            ("language", self.language.as_str()),
            ("sortBy", "publishedAt"),
            ("apiKey", self.api_key.as_str()),
        ])
    }

    /// Fetch the latest articles, most recent first
    ///
    /// Single attempt; non-success statuses carry the raw body back to the
    /// caller.
    pub async fn fetch_articles(&self) -> Result<Vec<RawArticle>> {
        let request_start = Instant::now();

        let response = match tokio::time::timeout(self.timeout, self.build_request().send()).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                self.health_tracker.record_failure();
                if e.is_timeout() {
                    return Err(NewsError::Timeout(self.timeout.as_secs()));
                }
                return Err(NewsError::ApiError(e.to_string()));
            }
            Err(_) => {
                self.health_tracker.record_failure();
                return Err(NewsError::Timeout(self.timeout.as_secs()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.health_tracker.record_failure();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let data: EverythingResponse = response.json().await.map_err(|e| {
            self.health_tracker.record_failure();
            NewsError::InvalidResponse(e.to_string())
        })?;

        let latency_ms = request_start.elapsed().as_millis() as u64;
        self.health_tracker.record_success(latency_ms);

        info!(
            "NewsAPI returned {} articles in {}ms",
            data.articles.len(),
            latency_ms
        );

        Ok(data.articles)
    }

    /// Get health status using internal metrics (no API call)
    pub async fn health(&self) -> SourceHealth {
        let last_success_ms = self.health_tracker.last_success_ms.load(Ordering::Relaxed);
        let last_success = if last_success_ms > 0 {
            DateTime::from_timestamp_millis(last_success_ms as i64)
        } else {
            None
        };

        let is_healthy = self.health_tracker.is_healthy();

        SourceHealth {
            source: "newsapi".to_string(),
            is_healthy,
            last_success,
            last_error: if is_healthy {
                None
            } else {
                Some("Recent failures detected".to_string())
            },
            success_rate: self.health_tracker.success_rate(),
            avg_latency_ms: self.health_tracker.last_latency_ms.load(Ordering::Relaxed),
        }
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch_articles(&self) -> Result<Vec<RawArticle>> {
        NewsApiClient::fetch_articles(self).await
    }

    async fn health(&self) -> SourceHealth {
        NewsApiClient::health(self).await
    }

    fn name(&self) -> &str {
        "newsapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_ors_every_symbol() {
        assert_eq!(
            NewsApiClient::query(),
            "EURUSD OR GBPUSD OR USDJPY OR XAUUSD"
        );
    }

    #[test]
    fn test_health_tracker_transitions() {
        let tracker = HealthTracker::new();
        assert!(tracker.is_healthy());
        assert_eq!(tracker.success_rate(), 1.0);

        tracker.record_failure();
        assert!(!tracker.is_healthy());
        assert_eq!(tracker.success_rate(), 0.0);

        std::thread::sleep(Duration::from_millis(2));
        tracker.record_success(25);
        assert!(tracker.is_healthy());
        assert_eq!(tracker.success_rate(), 0.5);
        assert_eq!(tracker.last_latency_ms.load(Ordering::Relaxed), 25);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings = Settings {
            newsapi_base_url: "http://localhost:9999/v2/".to_string(),
            ..Settings::default()
        };
        let client = NewsApiClient::new(&settings).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v2");
    }
}
