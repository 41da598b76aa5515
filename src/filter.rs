// Relevance classification and response shaping for provider articles
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::config::TagTable;
use crate::types::{FilteredArticle, Instrument, RawArticle};

/// Output format for article timestamps
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Placeholder when a timestamp is missing or unparseable
pub const MISSING_DATETIME: &str = "N/A";
const UNKNOWN_SOURCE: &str = "Unknown";
const MISSING_URL: &str = "#";

/// ISO-8601 shapes carrying a numeric offset (`Z` is rewritten to `+00:00` first)
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];
/// Naive ISO-8601 shapes accepted when there is no offset
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Instruments whose tags appear anywhere in `text`
///
/// `text` must already be lower-cased. Result follows instrument order.
pub fn classify(text: &str, tags: &TagTable) -> Vec<Instrument> {
    tags.iter()
        .filter(|(_, tags)| tags.iter().any(|tag| text.contains(tag.as_str())))
        .map(|(instrument, _)| instrument)
        .collect()
}

/// Reformat a provider timestamp as `YYYY-MM-DD HH:MM:SS`
///
/// Offset timestamps keep their own wall-clock time; no conversion to UTC.
/// Surrounding whitespace is rejected.
pub fn parse_published(raw: &str) -> Result<String, chrono::ParseError> {
    let strict = DateTime::parse_from_rfc3339(raw);
    if let Ok(dt) = strict {
        return Ok(dt.format(DATETIME_FORMAT).to_string());
    }
    if raw.trim() != raw {
        return strict.map(|dt| dt.format(DATETIME_FORMAT).to_string());
    }

    let zulu = raw
        .strip_suffix(['Z', 'z'])
        .map(|head| format!("{}+00:00", head));
    let with_offset = zulu.as_deref().unwrap_or(raw);

    let mut last_err = None;
    for fmt in OFFSET_FORMATS {
        match DateTime::parse_from_str(with_offset, fmt) {
            Ok(dt) => return Ok(dt.format(DATETIME_FORMAT).to_string()),
            Err(e) => last_err = Some(e),
        }
    }

    for fmt in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(raw, fmt) {
            Ok(dt) => return Ok(dt.format(DATETIME_FORMAT).to_string()),
            Err(e) => last_err = Some(e),
        }
    }

    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Ok(format!("{} 00:00:00", date.format("%Y-%m-%d"))),
        Err(e) => Err(last_err.unwrap_or(e)),
    }
}

/// Timestamp column for a filtered article, falling back to "N/A"
pub fn format_published(published_at: Option<&str>) -> String {
    match published_at {
        Some(raw) => parse_published(raw).unwrap_or_else(|e| {
            tracing::debug!("Unparseable publish timestamp {:?}: {}", raw, e);
            MISSING_DATETIME.to_string()
        }),
        None => MISSING_DATETIME.to_string(),
    }
}

/// Classify and reshape one article; `None` when no instrument matches
pub fn filter_article(article: RawArticle, tags: &TagTable) -> Option<FilteredArticle> {
    let title = article.title.unwrap_or_default();
    let description = article.description.unwrap_or_default();

    let text = format!("{} {}", title, description).to_lowercase();
    let currencies = classify(&text, tags);
    if currencies.is_empty() {
        return None;
    }

    Some(FilteredArticle {
        headline: title,
        summary: description,
        source: article
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        url: article.url.unwrap_or_else(|| MISSING_URL.to_string()),
        datetime: format_published(article.published_at.as_deref()),
        currencies,
    })
}

/// Keep relevant articles in provider order, at most `limit`
pub fn filter_articles<I>(articles: I, tags: &TagTable, limit: usize) -> Vec<FilteredArticle>
where
    I: IntoIterator<Item = RawArticle>,
{
    articles
        .into_iter()
        .filter_map(|article| filter_article(article, tags))
        .take(limit)
        .collect()
}
