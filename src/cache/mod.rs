use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::app::Result;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Get-or-compute cache keyed by source URL.
///
/// Only successful values are stored. Two concurrent misses on the same key
/// may both compute; the later insert wins.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
        entries.insert(
            key.into(),
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Return the cached value for `key`, or run `compute` and cache its
    /// result. A zero TTL disables caching.
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if self.ttl.is_zero() {
            return compute().await;
        }

        if let Some(value) = self.get(key).await {
            debug!(key, "cache hit");
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
