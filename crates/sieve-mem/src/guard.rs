//! MemoryBudget + RAII guard implementations.
//!
//! A guard is acquired before materializing and grown as rows arrive.
//! Dropping the guard returns its bytes to the budget, including on early
//! returns and unwinding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sieve_core::budget::{BudgetGuard, MemoryBudget};

use crate::error::{Error, Result};

struct BudgetInner {
    capacity: usize,
    used: AtomicUsize,
}

impl BudgetInner {
    fn reserve(&self, bytes: usize) -> bool {
        let mut cur = self.used.load(Ordering::Relaxed);
        loop {
            let next = cur.saturating_add(bytes);
            if next > self.capacity {
                return false;
            }
            match self
                .used
                .compare_exchange_weak(cur, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(observed) => cur = observed,
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Byte-capped budget shared by every guard it hands out.
#[derive(Clone)]
pub struct MemoryBudgetImpl {
    inner: Arc<BudgetInner>,
}

impl MemoryBudgetImpl {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Arc::new(BudgetInner {
                capacity: capacity_bytes,
                used: AtomicUsize::new(0),
            }),
        }
    }

    /// Like `try_acquire`, but reports the shortfall as an error.
    pub fn acquire(&self, bytes: usize, tag: &'static str) -> Result<BudgetGuardImpl> {
        self.try_acquire(bytes, tag)
            .ok_or_else(|| Error::BudgetExceeded {
                tag,
                requested: bytes,
                capacity: self.inner.capacity,
                used: self.inner.used.load(Ordering::Relaxed),
            })
    }

    /// Bytes still available (advisory).
    pub fn remaining_bytes(&self) -> usize {
        self.inner
            .capacity
            .saturating_sub(self.inner.used.load(Ordering::Relaxed))
    }
}

impl MemoryBudget for MemoryBudgetImpl {
    type Guard = BudgetGuardImpl;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard> {
        if bytes > 0 && !self.inner.reserve(bytes) {
            return None;
        }
        Some(BudgetGuardImpl {
            inner: Arc::clone(&self.inner),
            bytes,
            tag,
        })
    }

    fn capacity_bytes(&self) -> usize {
        self.inner.capacity
    }

    fn used_bytes(&self) -> usize {
        self.inner.used.load(Ordering::Relaxed)
    }
}

/// RAII guard that accounts for a number of bytes.
pub struct BudgetGuardImpl {
    inner: Arc<BudgetInner>,
    bytes: usize,
    tag: &'static str,
}

impl BudgetGuard for BudgetGuardImpl {
    fn bytes(&self) -> usize {
        self.bytes
    }

    fn tag(&self) -> &'static str {
        self.tag
    }

    fn try_resize(&mut self, new_bytes: usize) -> bool {
        if new_bytes <= self.bytes {
            self.inner.release(self.bytes - new_bytes);
            self.bytes = new_bytes;
            return true;
        }
        if self.inner.reserve(new_bytes - self.bytes) {
            self.bytes = new_bytes;
            true
        } else {
            false
        }
    }
}

impl Drop for BudgetGuardImpl {
    fn drop(&mut self) {
        if self.bytes > 0 {
            // NOTE: do not log here to keep drop path fast.
            self.inner.release(self.bytes);
            self.bytes = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_reports_shortfall() {
        let budget = MemoryBudgetImpl::new(100);
        let _g = budget.acquire(80, "rows").unwrap();
        match budget.acquire(30, "rows") {
            Err(Error::BudgetExceeded {
                requested, used, ..
            }) => {
                assert_eq!(requested, 30);
                assert_eq!(used, 80);
            }
            other => panic!("expected BudgetExceeded, got {:?}", other.map(|g| g.bytes())),
        }
        assert_eq!(budget.remaining_bytes(), 20);
    }

    #[test]
    fn failed_grow_leaves_guard_unchanged() {
        let budget = MemoryBudgetImpl::new(64);
        let mut g = budget.try_acquire(0, "rows").unwrap();
        assert!(g.try_resize(60));
        assert!(!g.try_resize(65));
        assert_eq!(g.bytes(), 60);
        assert_eq!(budget.used_bytes(), 60);
        drop(g);
        assert_eq!(budget.used_bytes(), 0);
    }
}
