use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide ingestion quality counters, shared between the pipeline and
/// whoever reports on it. Only [`QualityCounters::reset`] sets them back to
/// zero.
#[derive(Debug, Default)]
pub struct QualityCounters {
    received: AtomicU64,
    accepted: AtomicU64,
    rejected_invalid: AtomicU64,
    rejected_stale: AtomicU64,
    rejected_duplicate: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualitySnapshot {
    pub received: u64,
    pub accepted: u64,
    pub rejected_invalid: u64,
    pub rejected_stale: u64,
    pub rejected_duplicate: u64,
}

impl QualityCounters {
    pub fn new() -> QualityCounters {
        QualityCounters::default()
    }

    pub fn snapshot(&self) -> QualitySnapshot {
        QualitySnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            rejected_stale: self.rejected_stale.load(Ordering::Relaxed),
            rejected_duplicate: self.rejected_duplicate.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.received,
            &self.accepted,
            &self.rejected_invalid,
            &self.rejected_stale,
            &self.rejected_duplicate,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Returns the new total.
    pub(crate) fn add_received(&self) -> u64 {
        self.received.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn add_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_invalid(&self) {
        self.rejected_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_stale(&self) {
        self.rejected_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_duplicate(&self) {
        self.rejected_duplicate.fetch_add(1, Ordering::Relaxed);
    }
}

impl QualitySnapshot {
    pub fn rejected(&self) -> u64 {
        self.rejected_invalid + self.rejected_stale + self.rejected_duplicate
    }
}
