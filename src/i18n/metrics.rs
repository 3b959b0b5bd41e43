//! Resolution metrics and observability module.
//!
//! Each factory owns its own metrics, so independent stores do not share
//! counters. Cache misses equal the number of resolver invocations.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one store/factory.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Number of times a resolved table was served from the memo
    cache_hits: AtomicUsize,

    /// Number of times a table had to be resolved
    cache_misses: AtomicUsize,

    /// Number of `set_language` calls
    language_changes: AtomicUsize,

    /// Number of subscriber callbacks invoked
    notifications: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a memo hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a resolver invocation.
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_language_change(&self) {
        self.language_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn language_changes(&self) -> usize {
        self.language_changes.load(Ordering::Relaxed)
    }

    pub fn notifications(&self) -> usize {
        self.notifications.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_lookups = hits + misses;
        let cache_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            language_changes: self.language_changes(),
            notifications: self.notifications(),
        }
    }

    /// Reset all metrics to zero.
    #[cfg(test)]
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.language_changes.store(0, Ordering::Relaxed);
        self.notifications.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of the resolution counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,

    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub language_changes: usize,

    pub notifications: usize,
}
