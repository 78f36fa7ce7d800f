//! Byte-budget traits.
//!
//! `sieve-mem` provides the atomic implementation; the loader only needs the
//! traits, so a probe can be driven by any budget (tests use small caps).

/// Bytes held against a budget until dropped.
pub trait BudgetGuard: Send {
    fn bytes(&self) -> usize;

    /// Move this reservation to `new_bytes`. Shrinking always succeeds.
    /// Growing returns `false` and changes nothing when the cap would be
    /// crossed.
    fn try_resize(&mut self, new_bytes: usize) -> bool;

    fn tag(&self) -> &'static str {
        "guard"
    }
}

/// A fixed byte cap shared by the guards it hands out.
///
/// The full-read path asks for a guard up front and grows it row by row;
/// a refusal at either step means the source does not fit.
pub trait MemoryBudget: Send + Sync + 'static {
    type Guard: BudgetGuard;

    /// Reserve `bytes`, or `None` if that would cross the cap.
    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard>;

    fn capacity_bytes(&self) -> usize;

    /// Bytes currently reserved. Advisory under concurrency.
    fn used_bytes(&self) -> usize;
}
