//! Per-call load parameters.

use serde::{Deserialize, Serialize};
use sieve_core::config::DEFAULT_CHUNK_SIZE;

use crate::error::{LoadError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Keep-probability per row, in `(0, 1]`. Only consulted if the full
    /// read is exhausted; it never turns a successful full read into a sample.
    pub sample_frac: Option<f64>,
    /// Read exactly the first `min(nrows, total_rows)` rows. Overrides everything else.
    pub nrows: Option<u64>,
    /// Rows per streamed chunk on the sampling path.
    pub chunk_size: usize,
}

impl Default for LoadRequest {
    fn default() -> Self {
        Self {
            sample_frac: None,
            nrows: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl LoadRequest {
    pub fn with_sample_frac(mut self, frac: f64) -> Self {
        self.sample_frac = Some(frac);
        self
    }

    pub fn with_nrows(mut self, nrows: u64) -> Self {
        self.nrows = Some(nrows);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Checked on every call, whichever path ends up running.
    pub fn validate(&self) -> Result<()> {
        if let Some(frac) = self.sample_frac {
            // NaN fails both comparisons.
            if !(frac > 0.0 && frac <= 1.0) {
                return Err(LoadError::Configuration(format!(
                    "sample_frac must be in (0, 1], got {}",
                    frac
                )));
            }
        }
        if self.chunk_size == 0 {
            return Err(LoadError::Configuration(
                "chunk_size must be a positive number of rows".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunk_size_is_200k() {
        assert_eq!(LoadRequest::default().chunk_size, 200_000);
    }

    #[test]
    fn sample_frac_bounds() {
        for ok in [1e-9, 0.1, 1.0] {
            assert!(LoadRequest::default().with_sample_frac(ok).validate().is_ok());
        }
        for bad in [0.0, -0.5, 1.0001, f64::NAN, f64::INFINITY] {
            let err = LoadRequest::default()
                .with_sample_frac(bad)
                .validate()
                .unwrap_err();
            assert!(err.is_configuration(), "{bad}: {err}");
        }
    }

    #[test]
    fn zero_chunk_size_rejected() {
        assert!(LoadRequest::default()
            .with_chunk_size(0)
            .validate()
            .unwrap_err()
            .is_configuration());
    }
}
