#![forbid(unsafe_code)]
//! sieve-mem: Hard memory budgeting and peak tracking.
//!
//! Concrete implementations of the interfaces in `sieve-core::budget`. The
//! loader's full-read path accounts every materialized row through a guard
//! from this crate, so "the source does not fit" is an observable outcome
//! (a failed grow) rather than an allocator abort.

pub mod error;
pub mod guard;
pub mod tracking;

pub use error::{Error, Result};
pub use guard::{BudgetGuardImpl, MemoryBudgetImpl};
pub use tracking::PeakTracker;
