// src/services/cache.rs

//! Time-expiring topic cache with stale-on-error fallback.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::TopicRecord;
use crate::utils::clock::Clock;

/// A cached payload and the moment it was produced.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Vec<TopicRecord>,
    pub produced_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.produced_at < ttl
    }
}

/// Per-topic cache shared by the aggregator and its extractors.
///
/// The key set is small and fixed, so entries are never evicted. A failed
/// refresh keeps the previous entry around to be served stale.
pub struct TopicCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TopicCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Return the cached payload for `key`, refreshing it through `producer`
    /// when missing or expired.
    ///
    /// If the producer fails and an older entry exists, that entry is
    /// returned regardless of its age. Only when no entry exists at all is
    /// the producer's error propagated.
    pub async fn get_or_refresh<F, Fut>(&self, key: &str, producer: F) -> Result<Vec<TopicRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<TopicRecord>>>,
    {
        if let Some(entry) = self.entries.read().await.get(key) {
            if entry.is_fresh(self.clock.now(), self.ttl) {
                log::debug!("Using cached data for: {}", key);
                return Ok(entry.payload.clone());
            }
        }

        // The lock is released while the producer runs; concurrent refreshes
        // of the same key are harmless and the last writer wins.
        match producer().await {
            Ok(payload) => {
                let entry = CacheEntry {
                    payload: payload.clone(),
                    produced_at: self.clock.now(),
                };
                self.entries.write().await.insert(key.to_string(), entry);
                log::info!("Cached new data for: {} ({} records)", key, payload.len());
                Ok(payload)
            }
            Err(e) => match self.entries.read().await.get(key) {
                Some(entry) => {
                    log::warn!(
                        "Refreshing {} failed ({}), using stale cache from {}",
                        key,
                        e,
                        entry.produced_at
                    );
                    Ok(entry.payload.clone())
                }
                None => Err(e),
            },
        }
    }

    /// Current entry for `key`, fresh or not.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Number of cached keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
