//! Peak-usage tracking for memory that is observed but not capped.
//!
//! The sampling path keeps one chunk plus the retained rows so far; that
//! total is allowed to grow, so it is recorded here rather than charged to a
//! `MemoryBudgetImpl`.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct PeakTracker {
    current_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new "in use" value; updates peak if higher.
    pub fn record_used(&self, used_bytes: usize) {
        self.current_bytes.store(used_bytes, Ordering::Relaxed);
        let prev = self.peak_bytes.fetch_max(used_bytes, Ordering::AcqRel);
        #[cfg(feature = "tracing")]
        if used_bytes > prev {
            tracing::trace!(used_bytes, "new peak");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = prev;
    }

    pub fn current(&self) -> usize {
        self.current_bytes.load(Ordering::Relaxed)
    }

    pub fn peak(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_survives_lower_readings() {
        let t = PeakTracker::new();
        t.record_used(10);
        t.record_used(50);
        t.record_used(20);
        assert_eq!(t.current(), 20);
        assert_eq!(t.peak(), 50);
    }
}
