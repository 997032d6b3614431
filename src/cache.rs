use chrono::{DateTime, Utc};
use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::weather::{CityKey, WeatherRecord};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub record: WeatherRecord,
    pub stored_at: Instant,
    pub stored_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryStatus {
    pub city: String,
    pub age_ms: u64,
    pub expired: bool,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub ttl_ms: u64,
    pub max_entries: u64,
    pub entries: Vec<CacheEntryStatus>,
}

/// Per-city record cache with a fixed expiry threshold.
///
/// Expiry is judged here rather than by moka's own TTL so that expired
/// entries stay visible to [`WeatherCache::status`] until a read or a sweep
/// removes them.
pub struct WeatherCache {
    entries: Cache<CityKey, CacheEntry>,
    ttl: Duration,
    max_entries: u64,
}

impl WeatherCache {
    /// A capacity of zero is raised to one; moka would otherwise drop every insert.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let max_entries = max_entries.max(1);
        let entries = Cache::builder().max_capacity(max_entries).build();

        Self {
            entries,
            ttl,
            max_entries,
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        entry.age(now) > self.ttl
    }

    /// Returns the entry for `key` if it is still fresh. An expired entry is
    /// evicted on the way out.
    pub fn get(&self, key: &CityKey) -> Option<CacheEntry> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;

        if self.is_expired(&entry, now) {
            return self.evict_if_expired(key, now);
        }

        Some(entry)
    }

    /// Removes the entry for `key` only if it is still expired at `now`,
    /// checked under moka's per-key lock. A record written after the caller
    /// saw the stale one survives and is returned.
    fn evict_if_expired(&self, key: &CityKey, now: Instant) -> Option<CacheEntry> {
        let outcome = self
            .entries
            .entry_by_ref(key)
            .and_compute_with(|current| match current {
                Some(current) if self.is_expired(current.value(), now) => Op::Remove,
                _ => Op::Nop,
            });

        match outcome {
            CompResult::Removed(_) => {
                debug!("⌛ Cache entry for {} expired, evicting", key);
                None
            }
            CompResult::Unchanged(current) => Some(current.into_value()),
            _ => None,
        }
    }

    pub fn put(&self, key: CityKey, record: WeatherRecord) {
        let entry = CacheEntry {
            record,
            stored_at: Instant::now(),
            stored_at_utc: Utc::now(),
        };
        self.entries.insert(key, entry);
        // Apply capacity eviction now so status() never exceeds max_entries.
        self.entries.run_pending_tasks();
    }

    /// Snapshot of every entry. Never evicts.
    pub fn status(&self) -> CacheStatus {
        let now = Instant::now();

        let mut entries: Vec<CacheEntryStatus> = self
            .entries
            .iter()
            .map(|(key, entry)| CacheEntryStatus {
                city: key.to_string(),
                age_ms: entry.age(now).as_millis() as u64,
                expired: self.is_expired(&entry, now),
                stored_at: entry.stored_at_utc,
            })
            .collect();
        entries.sort_by(|a, b| a.city.cmp(&b.city));

        let expired_entries = entries.iter().filter(|entry| entry.expired).count();

        CacheStatus {
            total_entries: entries.len(),
            valid_entries: entries.len() - expired_entries,
            expired_entries,
            ttl_ms: self.ttl.as_millis() as u64,
            max_entries: self.max_entries,
            entries,
        }
    }

    pub fn clear_all(&self) {
        let keys: Vec<_> = self.entries.iter().map(|(key, _)| key).collect();
        for key in keys {
            self.entries.invalidate(&*key);
        }
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let now = Instant::now();

        let expired: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(key, _)| key)
            .collect();

        let mut removed = 0;
        for key in expired {
            if self.entries.remove(&*key).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("🧹 Swept {} expired cache entries", removed);
        }
        removed
    }
}
