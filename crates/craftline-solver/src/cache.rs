//! Craftability memoization.
//!
//! Records are keyed by recipe, inventory fingerprint and the option flags
//! that change an evaluation. The whole cache is dropped when a solve sees
//! a new fingerprint, when the maximum age since the last full
//! invalidation passes, or on explicit request. On overflow the oldest
//! inserted fraction is evicted (insertion order, not recency of use).

use chrono::Utc;
use craftline_common::RecipeId;
use crossbeam_channel::Sender;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::SolveResult;
use crate::events::{InvalidationReason, SolverEvent};
use crate::inventory::Fingerprint;
use crate::options::ResultFlags;
use crate::outcome::CraftabilityRecord;

/// Cache key: equal keys always map to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Recipe evaluated
    pub recipe_id: RecipeId,
    /// Inventory state evaluated against
    pub fingerprint: Fingerprint,
    /// Evaluation-affecting option flags
    pub flags: ResultFlags,
}

impl CacheKey {
    /// Creates a cache key.
    #[must_use]
    pub const fn new(recipe_id: RecipeId, fingerprint: Fingerprint, flags: ResultFlags) -> Self {
        Self {
            recipe_id,
            fingerprint,
            flags,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    record: Arc<CraftabilityRecord>,
    sequence: u64,
}

#[derive(Debug)]
struct Freshness {
    fingerprint: Option<Fingerprint>,
    last_invalidation: Instant,
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that had to compute
    pub misses: u64,
    /// Entries currently held
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 with no lookups.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Concurrent craftability cache.
pub struct CraftabilityCache {
    entries: DashMap<CacheKey, CacheEntry>,
    sequence: AtomicU64,
    capacity: usize,
    eviction_fraction: f64,
    max_age: Duration,
    freshness: Mutex<Freshness>,
    eviction: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
    events: Option<Sender<SolverEvent>>,
}

impl CraftabilityCache {
    /// Creates a cache.
    ///
    /// # Arguments
    /// * `capacity` - Entry count that triggers eviction
    /// * `eviction_fraction` - Share of entries evicted on overflow
    /// * `max_age` - Time after which all entries are considered stale
    #[must_use]
    pub fn new(capacity: usize, eviction_fraction: f64, max_age: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            sequence: AtomicU64::new(0),
            capacity: capacity.max(1),
            eviction_fraction: eviction_fraction.clamp(f64::EPSILON, 1.0),
            max_age,
            freshness: Mutex::new(Freshness {
                fingerprint: None,
                last_invalidation: Instant::now(),
            }),
            eviction: Mutex::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            events: None,
        }
    }

    /// Publishes invalidation notifications on `sender`.
    #[must_use]
    pub fn with_event_sender(mut self, sender: Sender<SolverEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Looks up a record.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CraftabilityRecord>> {
        let found = self.entries.get(key).map(|e| Arc::clone(&e.record));
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores a record, evicting the oldest entries first when full.
    pub fn insert(&self, key: CacheKey, record: CraftabilityRecord) -> Arc<CraftabilityRecord> {
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let record = Arc::new(record);
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let entry = self.entries.entry(key).or_insert(CacheEntry {
            record: Arc::clone(&record),
            sequence,
        });
        Arc::clone(&entry.record)
    }

    /// Returns the cached record or computes and stores it. Errors are not
    /// cached.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> SolveResult<Arc<CraftabilityRecord>>
    where
        F: FnOnce() -> SolveResult<CraftabilityRecord>,
    {
        if let Some(record) = self.get(&key) {
            return Ok(record);
        }
        let record = compute()?;
        Ok(self.insert(key, record))
    }

    /// Checks staleness against the fingerprint of the snapshot about to be
    /// solved. Returns the number of entries cleared, if any.
    pub fn observe_fingerprint(&self, fingerprint: Fingerprint) -> Option<usize> {
        let mut freshness = self.freshness.lock();

        let reason = match freshness.fingerprint {
            Some(previous) if previous != fingerprint => Some(InvalidationReason::FingerprintChanged),
            _ if freshness.last_invalidation.elapsed() >= self.max_age => {
                Some(InvalidationReason::Expired)
            },
            _ => None,
        };
        freshness.fingerprint = Some(fingerprint);

        reason.map(|reason| self.clear_locked(&mut freshness, reason))
    }

    /// Clears every entry and publishes a notification.
    pub fn invalidate(&self) -> usize {
        let mut freshness = self.freshness.lock();
        self.clear_locked(&mut freshness, InvalidationReason::Explicit)
    }

    fn clear_locked(&self, freshness: &mut Freshness, reason: InvalidationReason) -> usize {
        let entries_cleared = self.entries.len();
        self.entries.clear();
        freshness.last_invalidation = Instant::now();

        info!(entries_cleared, ?reason, "craftability cache invalidated");
        if let Some(events) = &self.events {
            let _ = events.try_send(SolverEvent::CacheInvalidated {
                entries_cleared,
                at: Utc::now(),
                reason,
            });
        }
        entries_cleared
    }

    fn evict_oldest(&self) {
        // Another thread already evicting is enough.
        let Some(_guard) = self.eviction.try_lock() else {
            return;
        };
        if self.entries.len() < self.capacity {
            return;
        }

        // Inserts that skipped eviction while another thread held the guard
        // are trimmed here along with the usual fraction.
        let overshoot = self.entries.len().saturating_sub(self.capacity);
        let count = overshoot
            + ((self.capacity as f64 * self.eviction_fraction).ceil() as usize).max(1);
        let mut by_age: Vec<(u64, CacheKey)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().sequence, *entry.key()))
            .collect();
        by_age.sort_unstable_by_key(|(sequence, _)| *sequence);

        for (_, key) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }
        debug!(evicted = count, remaining = self.entries.len(), "evicted oldest cache entries");
    }

    /// Number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current hit/miss counters and size.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl std::fmt::Debug for CraftabilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraftabilityCache")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}
