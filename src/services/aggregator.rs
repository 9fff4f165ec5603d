// src/services/aggregator.rs

//! Builds snapshots by running all topic extractors concurrently.

use std::sync::Arc;

use chrono::Duration;

use crate::error::Result;
use crate::models::{Config, Snapshot, Topic, TopicRecord};
use crate::services::cache::TopicCache;
use crate::services::extractors::{
    ExamExtractor, NewsExtractor, RegistrationExtractor, TopicExtractor,
};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::http::PageFetcher;

/// Combines the three topic extractors behind a shared cache.
pub struct Aggregator {
    cache: Arc<TopicCache>,
    registration: Arc<dyn TopicExtractor>,
    exams: Arc<dyn TopicExtractor>,
    news: Arc<dyn TopicExtractor>,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(
        cache: Arc<TopicCache>,
        registration: Arc<dyn TopicExtractor>,
        exams: Arc<dyn TopicExtractor>,
        news: Arc<dyn TopicExtractor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            registration,
            exams,
            news,
            clock,
        }
    }

    /// Wire up the network extractors described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = PageFetcher::from_config(&config.fetcher)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ttl = Duration::seconds(i64::try_from(config.cache.ttl_secs).unwrap_or(i64::MAX));
        let cache = Arc::new(TopicCache::new(ttl, clock.clone()));

        Ok(Self::new(
            cache,
            Arc::new(RegistrationExtractor::new(fetcher.clone(), &config.sources)),
            Arc::new(ExamExtractor::new(fetcher.clone(), &config.sources)),
            Arc::new(NewsExtractor::new(fetcher, &config.sources)),
            clock,
        ))
    }

    pub fn cache(&self) -> &TopicCache {
        &self.cache
    }

    /// Collect all topics into a fresh snapshot.
    ///
    /// Topics are fetched concurrently. A topic that fails without a cached
    /// fallback is replaced by its default set; the others are unaffected.
    pub async fn build_snapshot(&self) -> Snapshot {
        log::info!("Building snapshot");

        let (registration, exams, news) = tokio::join!(
            self.settle(&self.registration),
            self.settle(&self.exams),
            self.settle(&self.news),
        );

        let snapshot = Snapshot::new(registration, exams, news, self.clock.now());
        log::info!(
            "Snapshot ready: {} registration, {} exams, {} news",
            snapshot.registration.len(),
            snapshot.exams.len(),
            snapshot.news.len()
        );
        snapshot
    }

    async fn settle(&self, extractor: &Arc<dyn TopicExtractor>) -> Vec<TopicRecord> {
        let topic = extractor.topic();
        let outcome = self
            .cache
            .get_or_refresh(topic.cache_key(), || extractor.scrape())
            .await;
        extractor.settle(outcome)
    }

    /// Extractor responsible for `topic`.
    pub fn extractor(&self, topic: Topic) -> &dyn TopicExtractor {
        match topic {
            Topic::Registration => self.registration.as_ref(),
            Topic::Exams => self.exams.as_ref(),
            Topic::News => self.news.as_ref(),
        }
    }
}
