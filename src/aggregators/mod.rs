// Fetch + filter composition for the news feed
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::TagTable;
use crate::filter;
use crate::types::*;

/// Error label returned to clients when the provider call fails
pub const FETCH_FAILED: &str = "Failed to fetch news";

/// Pulls articles from a source and keeps the ones tied to tracked instruments
pub struct NewsAggregator {
    source: Arc<dyn NewsSource>,
    tags: TagTable,
    max_articles: usize,
}

impl NewsAggregator {
    pub fn new(source: Arc<dyn NewsSource>, tags: TagTable, max_articles: usize) -> Self {
        Self {
            source,
            tags,
            max_articles,
        }
    }

    /// Latest relevant articles, or the error payload if the fetch failed
    ///
    /// Never returns an `Err`: every provider failure is folded into
    /// [`NewsResponse::Failed`].
    pub async fn get_news(&self) -> NewsResponse {
        let articles = match self.source.fetch_articles().await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("{} fetch failed: {}", self.source.name(), e);
                return NewsResponse::Failed {
                    error: FETCH_FAILED.to_string(),
                    details: e.details(),
                };
            }
        };

        let fetched = articles.len();
        let filtered = filter::filter_articles(articles, &self.tags, self.max_articles);
        info!(
            "Kept {} of {} articles from {}",
            filtered.len(),
            fetched,
            self.source.name()
        );

        NewsResponse::Articles(filtered)
    }

    pub async fn health_check(&self) -> Vec<SourceHealth> {
        vec![self.source.health().await]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned source returning a fixed outcome
    struct StaticSource {
        outcome: fn() -> Result<Vec<RawArticle>>,
    }

    #[async_trait::async_trait]
    impl NewsSource for StaticSource {
        async fn fetch_articles(&self) -> Result<Vec<RawArticle>> {
            (self.outcome)()
        }

        async fn health(&self) -> SourceHealth {
            SourceHealth {
                source: "static".to_string(),
                is_healthy: true,
                last_success: None,
                last_error: None,
                success_rate: 1.0,
                avg_latency_ms: 0,
            }
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn aggregator(outcome: fn() -> Result<Vec<RawArticle>>) -> NewsAggregator {
        NewsAggregator::new(Arc::new(StaticSource { outcome }), TagTable::default(), 10)
    }

    #[test]
    fn test_upstream_failure_becomes_payload() {
        let agg = aggregator(|| {
            Err(NewsError::Upstream {
                status: 429,
                body: "rateLimited".to_string(),
            })
        });

        let resp = tokio_test::block_on(agg.get_news());
        assert_eq!(
            resp,
            NewsResponse::Failed {
                error: "Failed to fetch news".to_string(),
                details: "rateLimited".to_string(),
            }
        );
    }

    #[test]
    fn test_transport_failure_becomes_payload() {
        let agg = aggregator(|| Err(NewsError::Timeout(10)));
        match tokio_test::block_on(agg.get_news()) {
            NewsResponse::Failed { error, details } => {
                assert_eq!(error, FETCH_FAILED);
                assert!(details.contains("timed out"));
            }
            other => panic!("expected failure payload, got {:?}", other),
        }
    }

    #[test]
    fn test_filters_fetched_articles() {
        let agg = aggregator(|| {
            Ok(vec![
                RawArticle {
                    title: Some("Lagarde speaks".to_string()),
                    ..Default::default()
                },
                RawArticle {
                    title: Some("Cooking tips".to_string()),
                    ..Default::default()
                },
            ])
        });

        match tokio_test::block_on(agg.get_news()) {
            NewsResponse::Articles(articles) => {
                assert_eq!(articles.len(), 1);
                assert_eq!(articles[0].currencies, vec![Instrument::EurUsd]);
            }
            other => panic!("expected articles, got {:?}", other),
        }
    }

    #[test]
    fn test_health_check_reports_source() {
        let agg = aggregator(|| Ok(Vec::new()));
        let health = tokio_test::block_on(agg.health_check());
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].source, "static");
    }
}
