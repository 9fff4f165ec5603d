//! Per-topic extractors.
//!
//! Each extractor turns fetched pages (and, for registration and exams, the
//! static period table) into [`TopicRecord`]s. Live scraping is best effort:
//! [`TopicExtractor::extract`] always falls back to the topic's default set.

mod exams;
mod news;
mod registration;

pub use exams::{ExamExtractor, parse_exam_announcements, structured_exam_records};
pub use news::{CURRENT, NewsExtractor, parse_feed, parse_news_page};
pub use registration::{
    RegistrationExtractor, parse_registration_page, structured_registration_records,
};

use async_trait::async_trait;
use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};
use crate::models::{Topic, TopicRecord};
use crate::services::defaults;
use crate::utils::normalize_whitespace;

/// Upper bound of records taken from a single scraped page.
pub const MAX_LIVE_RECORDS: usize = 5;

/// Produces the records of one topic.
#[async_trait]
pub trait TopicExtractor: Send + Sync {
    /// Topic this extractor is responsible for.
    fn topic(&self) -> Topic;

    /// Live extraction.
    ///
    /// Fails when the pages cannot be fetched or nothing usable was found.
    /// This is what the topic cache wraps, so fallback data never replaces
    /// a good cache entry.
    async fn scrape(&self) -> Result<Vec<TopicRecord>>;

    /// Records served when live extraction fails.
    fn defaults(&self) -> Vec<TopicRecord> {
        defaults::for_topic(self.topic())
    }

    /// Turn the outcome of a live or cached scrape into the records to serve.
    ///
    /// Failures and empty results fall back to [`defaults`](Self::defaults),
    /// so the result is never empty.
    fn settle(&self, outcome: Result<Vec<TopicRecord>>) -> Vec<TopicRecord> {
        match outcome {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                log::warn!("No {} records found, using defaults", self.topic());
                self.defaults()
            }
            Err(e) if e.is_network() => {
                log::warn!("Sources for {} unreachable, using defaults: {}", self.topic(), e);
                self.defaults()
            }
            Err(e) => {
                log::error!("Error scraping {}: {}", self.topic(), e);
                self.defaults()
            }
        }
    }

    /// Live extraction with the default set as fallback. Never empty.
    async fn extract(&self) -> Vec<TopicRecord> {
        self.settle(self.scrape().await)
    }
}

/// Error for a scrape that finished without any usable record.
fn nothing_found(topic: Topic) -> AppError {
    AppError::extraction(topic.cache_key(), "no usable records found")
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Whitespace-normalized text of an element and its descendants.
fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant matching `selector`, or an empty string.
fn first_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(Topic);

    #[async_trait]
    impl TopicExtractor for Failing {
        fn topic(&self) -> Topic {
            self.0
        }

        async fn scrape(&self) -> Result<Vec<TopicRecord>> {
            Err(AppError::Status {
                url: "https://www.w-hs.de".to_string(),
                status: 502,
            })
        }
    }

    struct Empty;

    #[async_trait]
    impl TopicExtractor for Empty {
        fn topic(&self) -> Topic {
            Topic::News
        }

        async fn scrape(&self) -> Result<Vec<TopicRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_extract_falls_back_on_error() {
        for topic in Topic::ALL {
            let records = Failing(topic).extract().await;
            assert_eq!(records, defaults::for_topic(topic));
        }
    }

    #[tokio::test]
    async fn test_extract_falls_back_on_empty_result() {
        assert_eq!(Empty.extract().await, defaults::default_news());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
        assert!(parse_selector(".news-item, article").is_ok());
    }
}
