#![forbid(unsafe_code)]
//! sieve-loader: get rows from a large delimited file under a memory budget,
//! reproducibly.
//!
//! Strategy, first match wins:
//! 1. `nrows` set: read that many rows from the top of the file.
//! 2. Otherwise try a full read, charged row by row to a hard budget.
//! 3. If (and only if) the full read is exhausted, stream the file in
//!    fixed-size chunks and keep each row with probability `sample_frac`,
//!    drawn from a generator seeded by the config.
//!
//! Exhaustion is an explicit `Materialization::Exhausted` outcome of the
//! capacity probe, never a caught allocation failure.

pub mod error;
pub mod loader;
pub mod probe;
pub mod report;
pub mod request;
pub mod sampler;

pub use error::{LoadError, Result};
pub use loader::{load_csv_memory_friendly, BoundedLoader};
pub use probe::{CapacityProbe, ExhaustionCause, Materialization};
pub use report::{LoadReport, Strategy};
pub use request::LoadRequest;
pub use sampler::BernoulliSampler;
