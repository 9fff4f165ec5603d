// src/pipeline/refresh.rs

//! Snapshot refresh pipeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::Snapshot;
use crate::services::Aggregator;
use crate::storage::SnapshotStore;

/// Build a snapshot and make it the current one.
pub async fn run_refresh(aggregator: &Aggregator, store: &SnapshotStore) -> Arc<Snapshot> {
    let start_time = Utc::now();
    log::info!("Refreshing university data");

    let snapshot = aggregator.build_snapshot().await;
    let record_count = snapshot.record_count();
    store.replace(snapshot).await;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Refresh complete: {} records in {}ms",
        record_count,
        elapsed.num_milliseconds()
    );
    store.load().await
}

/// Refresh every `interval`, starting immediately.
///
/// Runs until the returned handle is aborted or the runtime shuts down.
pub fn spawn_refresh_loop(
    aggregator: Arc<Aggregator>,
    store: Arc<SnapshotStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_refresh(&aggregator, &store).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::models::{Topic, TopicRecord};
    use crate::services::{TopicCache, TopicExtractor};
    use crate::utils::clock::SystemClock;

    struct Counting {
        topic: Topic,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TopicExtractor for Counting {
        fn topic(&self) -> Topic {
            self.topic
        }

        async fn scrape(&self) -> Result<Vec<TopicRecord>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(vec![TopicRecord::new("Live", format!("run {n}"), "01.02.2025", "test")])
        }
    }

    fn counting(topic: Topic) -> Arc<Counting> {
        Arc::new(Counting {
            topic,
            calls: AtomicUsize::new(0),
        })
    }

    fn aggregator(exams: Arc<Counting>) -> Aggregator {
        let clock = Arc::new(SystemClock);
        // Zero TTL so every refresh hits the extractors
        let cache = Arc::new(TopicCache::new(chrono::Duration::zero(), clock.clone()));
        Aggregator::new(
            cache,
            counting(Topic::Registration),
            exams,
            counting(Topic::News),
            clock,
        )
    }

    #[tokio::test]
    async fn test_run_refresh_publishes_snapshot() {
        let store = SnapshotStore::new(Snapshot::with_defaults(Utc::now()));
        let aggregator = aggregator(counting(Topic::Exams));

        let published = run_refresh(&aggregator, &store).await;
        assert_eq!(published.exams[0].description, "run 1");
        assert_eq!(store.load().await.exams[0].description, "run 1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_loop_ticks_immediately_and_repeats() {
        let exams = counting(Topic::Exams);
        let store = Arc::new(SnapshotStore::new(Snapshot::with_defaults(Utc::now())));
        let handle = spawn_refresh_loop(
            Arc::new(aggregator(exams.clone())),
            store.clone(),
            Duration::from_secs(7200),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(exams.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert_eq!(exams.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.load().await.exams[0].description, "run 2");

        handle.abort();
    }
}
