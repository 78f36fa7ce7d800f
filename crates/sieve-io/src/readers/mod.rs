//! Streaming readers that produce `Table` batches.

pub mod csv;
