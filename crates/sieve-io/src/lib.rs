#![forbid(unsafe_code)]
//! sieve-io: delimited-text readers and table writers.
//!
//! `readers::csv::CsvReader` reads the header eagerly and then hands out
//! records one at a time, as bounded batches, or as an iterator of fixed-size
//! chunks. `writers` emit a result `Table` as CSV or NDJSON.

pub mod error;
pub mod readers;
pub mod writers;

pub use error::{Error, Result};
pub use readers::csv::{CsvChunks, CsvReader};
pub use writers::csv::CsvWriter;
pub use writers::jsonl::JsonlWriter;
