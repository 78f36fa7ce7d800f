//! What a load did, for logs and `--report` output.

use serde::Serialize;

use crate::probe::ExhaustionCause;

/// The path that produced the returned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum Strategy {
    Prefix {
        nrows: u64,
    },
    Full,
    Sample {
        sample_frac: f64,
        chunk_size: usize,
        seed: u64,
    },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Prefix { .. } => "prefix",
            Strategy::Full => "full",
            Strategy::Sample { .. } => "sample",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub strategy: Strategy,
    pub columns: Vec<String>,
    /// Data rows parsed by the pass that produced the result.
    pub rows_scanned: u64,
    pub rows_returned: u64,
    /// Chunks streamed; zero unless the sampling path ran.
    pub chunks_read: u64,
    pub bytes_scanned: u64,
    /// High-water mark of chunk plus retained rows on the sampling path.
    pub peak_tracked_bytes: usize,
    /// Set when the full read was abandoned in favour of sampling.
    pub exhaustion: Option<ExhaustionCause>,
    /// Hex blake3 digest of the returned table.
    pub fingerprint: String,
    pub elapsed_ms: u64,
    pub version: String,
}

impl LoadReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn emit(&self) {
        tracing::info!(
            source = %self.source,
            strategy = self.strategy.name(),
            rows_scanned = self.rows_scanned,
            rows_returned = self.rows_returned,
            chunks = self.chunks_read,
            peak_tracked_bytes = self.peak_tracked_bytes,
            elapsed_ms = self.elapsed_ms,
            fingerprint = %self.fingerprint,
            "load finished"
        );
    }
}
