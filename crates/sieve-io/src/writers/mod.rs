//! Result-table writers.

pub mod csv;
pub mod jsonl;
