//! Time-based cache for rendered index pages
//!
//! The index feed is the hottest page and is allowed to be stale: a
//! rendered body is served unchanged until its TTL runs out or the cache is
//! cleared explicitly. Writes to posts do NOT invalidate entries.
//!
//! The map is bounded: once it reaches `max_entries`, an insert first
//! sweeps expired pages and then, if still full, evicts a tenth of what is
//! left.

use crate::metrics::INDEX_CACHE_EVENTS;
use bytes::Bytes;
use dashmap::DashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default bound on cached pages.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

#[derive(Debug, Clone)]
struct CachedPage {
    body: Bytes,
    expires_at: Instant,
}

impl CachedPage {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local page cache with a single fixed TTL
pub struct IndexPageCache {
    store: DashMap<String, CachedPage>,
    ttl: Duration,
    max_entries: usize,
}

impl IndexPageCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_limits(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> Self {
        debug!(
            ttl_secs = ttl.as_secs(),
            max_entries, "Initializing index page cache"
        );
        Self {
            store: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Cached body for `key`, if present and fresh.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired(now) {
                INDEX_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                debug!(key, "index cache HIT");
                return Some(entry.body.clone());
            }
        }

        // Drop the stale entry (if any) outside the read guard.
        self.store.remove_if(key, |_, entry| entry.is_expired(now));
        INDEX_CACHE_EVENTS.with_label_values(&["miss"]).inc();
        debug!(key, "index cache MISS");
        None
    }

    pub fn insert(&self, key: impl Into<String>, body: Bytes) {
        if self.ttl.is_zero() {
            return;
        }
        let key = key.into();
        if !self.store.contains_key(&key) && self.store.len() >= self.max_entries {
            self.make_room();
        }
        self.store.insert(
            key,
            CachedPage {
                body,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop expired pages; if the map is still full, evict roughly 10%
    /// of the remaining entries in iteration order.
    fn make_room(&self) {
        let now = Instant::now();
        self.store.retain(|_, entry| !entry.is_expired(now));
        if self.store.len() < self.max_entries {
            return;
        }

        let evict_count = (self.store.len() / 10).max(1);
        warn!(
            entries = self.store.len(),
            evict_count, "index cache full, evicting entries"
        );
        let victims: Vec<String> = self
            .store
            .iter()
            .take(evict_count)
            .map(|entry| entry.key().clone())
            .collect();
        for key in victims {
            self.store.remove(&key);
        }
        INDEX_CACHE_EVENTS.with_label_values(&["evict"]).inc();
    }

    /// Serve from cache, or render, store and return the fresh body.
    /// Render failures are returned as-is and nothing is cached.
    pub async fn get_or_render<F, Fut, E>(&self, key: &str, render: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if let Some(body) = self.get(key) {
            return Ok(body);
        }

        let body = render().await?;
        self.insert(key, body.clone());
        Ok(body)
    }

    /// Drop every cached page.
    pub fn clear(&self) {
        self.store.clear();
        INDEX_CACHE_EVENTS.with_label_values(&["clear"]).inc();
        debug!("index cache CLEAR");
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
