//! Service configuration
//!
//! Settings are read once at startup from defaults, an optional
//! `forex-pulse.toml`, and `FOREX_PULSE_*` environment variables, then handed
//! to components as an immutable value.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::{Instrument, NewsError, Result};

const ENV_PREFIX: &str = "FOREX_PULSE";
const CONFIG_FILE: &str = "forex-pulse";

/// Default provider endpoint
pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// NewsAPI access key, sent as the `apiKey` query parameter
    pub newsapi_key: String,
    pub newsapi_base_url: String,
    pub request_timeout_secs: u64,
    /// Most articles returned by `/news`
    pub max_articles: usize,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            newsapi_key: String::new(),
            newsapi_base_url: DEFAULT_NEWSAPI_BASE_URL.to_string(),
            request_timeout_secs: 10,
            max_articles: 10,
            language: "en".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from file and environment
    ///
    /// A bare `PORT` variable wins over everything else so the service runs
    /// unchanged on platforms that inject it.
    pub fn load() -> Result<Self> {
        let defaults = Settings::default();

        let settings: Settings = config::Config::builder()
            .set_default("host", defaults.host)
            .and_then(|b| b.set_default("port", defaults.port as i64))
            .and_then(|b| b.set_default("newsapi_key", defaults.newsapi_key))
            .and_then(|b| b.set_default("newsapi_base_url", defaults.newsapi_base_url))
            .and_then(|b| b.set_default("request_timeout_secs", defaults.request_timeout_secs))
            .and_then(|b| b.set_default("max_articles", defaults.max_articles as u64))
            .and_then(|b| b.set_default("language", defaults.language))
            .map_err(|e| NewsError::Config(e.to_string()))?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .set_override_option("port", std::env::var("PORT").ok())
            .map_err(|e| NewsError::Config(e.to_string()))?
            .build()
            .map_err(|e| NewsError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| NewsError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.newsapi_base_url).map_err(|e| {
            NewsError::Config(format!(
                "newsapi_base_url {:?} is not a valid URL: {}",
                self.newsapi_base_url, e
            ))
        })?;

        if self.request_timeout_secs == 0 {
            return Err(NewsError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        if self.max_articles == 0 {
            return Err(NewsError::Config("max_articles must be positive".to_string()));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_api_key(&self) -> bool {
        !self.newsapi_key.trim().is_empty()
    }
}

/// Relevance tags per instrument
///
/// Tags are stored lower-cased so matching is a plain substring test against
/// lower-cased article text.
#[derive(Debug, Clone, PartialEq)]
pub struct TagTable {
    tags: BTreeMap<Instrument, Vec<String>>,
}

impl TagTable {
    pub fn new<I, T, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Instrument, T)>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = entries
            .into_iter()
            .map(|(instrument, tags)| {
                let tags = tags
                    .into_iter()
                    .map(|t| t.as_ref().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect();
                (instrument, tags)
            })
            .collect();

        Self { tags }
    }

    /// Lower-cased tags for an instrument (empty if unconfigured)
    pub fn tags(&self, instrument: Instrument) -> &[String] {
        self.tags.get(&instrument).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Instruments with their tags, in instrument order
    pub fn iter(&self) -> impl Iterator<Item = (Instrument, &[String])> {
        self.tags.iter().map(|(i, t)| (*i, t.as_slice()))
    }
}

impl Default for TagTable {
    fn default() -> Self {
        TagTable::new([
            (
                Instrument::EurUsd,
                &["EURUSD", "EUR", "euro", "ECB", "eurozone", "Lagarde"][..],
            ),
            (
                Instrument::GbpUsd,
                &["GBPUSD", "GBP", "pound", "sterling", "BoE", "UK", "Britain"][..],
            ),
            (
                Instrument::UsdJpy,
                &["USDJPY", "JPY", "yen", "BOJ", "Bank of Japan", "Tokyo", "Ueda"][..],
            ),
            (
                Instrument::XauUsd,
                &["XAUUSD", "gold", "XAU", "bullion", "precious metal"][..],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Process environment is global; loader tests take turns.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const LOADER_VARS: [&str; 5] = [
        "FOREX_PULSE_PORT",
        "FOREX_PULSE_NEWSAPI_KEY",
        "FOREX_PULSE_MAX_ARTICLES",
        "FOREX_PULSE_NEWSAPI_BASE_URL",
        "PORT",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in LOADER_VARS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
        for key in LOADER_VARS {
            std::env::remove_var(key);
        }
        if let Err(panic) = outcome {
            std::panic::resume_unwind(panic);
        }
    }

    #[test]
    fn test_load_defaults() {
        with_env(&[], || {
            let settings = Settings::load().unwrap();
            assert_eq!(settings.port, 8080);
            assert_eq!(settings.max_articles, 10);
            assert_eq!(settings.newsapi_base_url, DEFAULT_NEWSAPI_BASE_URL);
            assert!(!settings.has_api_key());
        });
    }

    #[test]
    fn test_load_reads_prefixed_env_and_port() {
        with_env(
            &[
                ("FOREX_PULSE_NEWSAPI_KEY", "abc"),
                ("FOREX_PULSE_MAX_ARTICLES", "5"),
                ("PORT", "9001"),
            ],
            || {
                let settings = Settings::load().unwrap();
                assert_eq!(settings.newsapi_key, "abc");
                assert_eq!(settings.max_articles, 5);
                assert_eq!(settings.port, 9001);
                assert_eq!(settings.language, "en");
                assert_eq!(settings.request_timeout_secs, 10);
            },
        );
    }

    #[test]
    fn test_bare_port_beats_prefixed_port() {
        with_env(&[("FOREX_PULSE_PORT", "7000")], || {
            assert_eq!(Settings::load().unwrap().port, 7000);
        });
        with_env(&[("FOREX_PULSE_PORT", "7000"), ("PORT", "9001")], || {
            assert_eq!(Settings::load().unwrap().port, 9001);
        });
    }

    #[test]
    fn test_load_rejects_invalid_base_url() {
        with_env(&[("FOREX_PULSE_NEWSAPI_BASE_URL", "not a url")], || {
            assert!(matches!(Settings::load(), Err(NewsError::Config(_))));
        });
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.max_articles, 10);
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert!(!settings.has_api_key());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = Settings {
            newsapi_base_url: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(bad_url.validate(), Err(NewsError::Config(_))));

        let zero_timeout = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(zero_timeout.validate().is_err());

        let zero_limit = Settings {
            max_articles: 0,
            ..Settings::default()
        };
        assert!(zero_limit.validate().is_err());
    }

    #[test]
    fn test_default_tags_lowercased() {
        let table = TagTable::default();
        assert!(table.tags(Instrument::EurUsd).contains(&"ecb".to_string()));
        assert!(table.tags(Instrument::UsdJpy).contains(&"bank of japan".to_string()));
        assert_eq!(table.tags(Instrument::GbpUsd).len(), 7);
    }

    #[test]
    fn test_tag_table_iterates_in_instrument_order() {
        let table = TagTable::new([
            (Instrument::XauUsd, vec!["gold"]),
            (Instrument::EurUsd, vec!["euro"]),
        ]);
        let order: Vec<_> = table.iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![Instrument::EurUsd, Instrument::XauUsd]);
        assert!(table.tags(Instrument::UsdJpy).is_empty());
    }
}
