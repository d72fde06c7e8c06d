//! Interception counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic counters for agent activity.
#[derive(Debug, Default)]
pub struct AgentCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    fallbacks: AtomicU64,
    passthroughs: AtomicU64,
    precached: AtomicU64,
    precache_skipped: AtomicU64,
    flushes: AtomicU64,
    flush_failures: AtomicU64,
}

impl AgentCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_passthrough(&self) {
        self.passthroughs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_precached(&self) {
        self.precached.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_precache_skipped(&self) {
        self.precache_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush_failure(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            passthroughs: self.passthroughs.load(Ordering::Relaxed),
            precached: self.precached.load(Ordering::Relaxed),
            precache_skipped: self.precache_skipped.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    /// Requests served from the cache.
    pub hits: u64,
    /// Requests that went to the network and were eligible for storage.
    pub misses: u64,
    /// Requests answered with the offline fallback.
    pub fallbacks: u64,
    /// Requests not intercepted.
    pub passthroughs: u64,
    /// Assets stored during install.
    pub precached: u64,
    /// Assets skipped during install.
    pub precache_skipped: u64,
    /// Successful sync flushes.
    pub flushes: u64,
    /// Failed sync flushes.
    pub flush_failures: u64,
}
