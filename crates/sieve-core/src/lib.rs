#![forbid(unsafe_code)]
//! sieve-core: pure data types shared by every sieve crate.
//!
//! Holds the header-driven `Schema`, the columnar `Table` returned to callers,
//! the memory-budget traits implemented by `sieve-mem`, the loader
//! configuration, and stable content hashing. No I/O lives here.

pub mod budget;
pub mod config;
pub mod error;
pub mod hash;
pub mod schema;
pub mod types;

pub use config::LoaderConfig;
pub use error::{Error, Result};
pub use schema::{Field, Schema};
pub use types::{Column, Scalar, Table};

/// Crate version, stamped into load reports.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
