//! Loader configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of records per streamed chunk on the sampling path.
pub const DEFAULT_CHUNK_SIZE: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Memory cap (in bytes) for a full, unsampled materialization.
    pub mem_cap_bytes: usize,

    /// Chunk size used when a request does not name one.
    pub default_chunk_size: usize,

    /// Seed for the per-row Bernoulli draws. Fixed so sampling is reproducible.
    pub seed: u64,

    /// Optional hard ceiling on materialized rows; crossing it counts as
    /// resource exhaustion. Lets tests force the sampling path deterministically.
    pub row_ceiling: Option<u64>,

    /// Expected in-memory size per on-disk byte. The capacity probe skips the
    /// full read when `file_len * inflation_factor` exceeds `mem_cap_bytes`.
    pub inflation_factor: f64,

    /// Capacity of the buffered reader wrapped around the source file.
    pub read_buffer_bytes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            mem_cap_bytes: 512 * 1024 * 1024, // 512 MiB default
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            seed: 0,
            row_ceiling: None,
            inflation_factor: 2.0,
            read_buffer_bytes: 1024 * 1024,
        }
    }
}

impl LoaderConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SIEVE_MEM_CAP_BYTES`: memory cap in bytes
    /// - `SIEVE_CHUNK_SIZE`: default rows per streamed chunk
    /// - `SIEVE_SEED`: sampling seed
    /// - `SIEVE_ROW_CEILING`: hard row ceiling for the full read
    /// - `SIEVE_INFLATION_FACTOR`: in-memory bytes per on-disk byte
    /// - `SIEVE_READ_BUFFER_BYTES`: read buffer capacity
    ///
    /// Unparsable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoaderConfig::from_env`] but over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = parse_var::<usize>(&lookup, "SIEVE_MEM_CAP_BYTES") {
            cfg.mem_cap_bytes = v;
        }
        if let Some(v) = parse_var::<usize>(&lookup, "SIEVE_CHUNK_SIZE") {
            cfg.default_chunk_size = v;
        }
        if let Some(v) = parse_var::<u64>(&lookup, "SIEVE_SEED") {
            cfg.seed = v;
        }
        if let Some(v) = parse_var::<u64>(&lookup, "SIEVE_ROW_CEILING") {
            cfg.row_ceiling = Some(v);
        }
        if let Some(v) = parse_var::<f64>(&lookup, "SIEVE_INFLATION_FACTOR") {
            cfg.inflation_factor = v;
        }
        if let Some(v) = parse_var::<usize>(&lookup, "SIEVE_READ_BUFFER_BYTES") {
            cfg.read_buffer_bytes = v;
        }

        cfg
    }

    /// Reject settings the loader cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.default_chunk_size == 0 {
            return Err(Error::Config("default_chunk_size must be positive".into()));
        }
        if !self.inflation_factor.is_finite() || self.inflation_factor < 0.0 {
            return Err(Error::Config(format!(
                "inflation_factor must be a non-negative finite number, got {}",
                self.inflation_factor
            )));
        }
        if self.read_buffer_bytes == 0 {
            return Err(Error::Config("read_buffer_bytes must be positive".into()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("SIEVE_MEM_CAP_BYTES", "4096"),
            ("SIEVE_SEED", "42"),
            ("SIEVE_ROW_CEILING", "10"),
        ]
        .into_iter()
        .collect();
        let cfg = LoaderConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.mem_cap_bytes, 4096);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.row_ceiling, Some(10));
        assert_eq!(cfg.default_chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let cfg = LoaderConfig::from_lookup(|k| match k {
            "SIEVE_CHUNK_SIZE" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(cfg, LoaderConfig::default());
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let cfg = LoaderConfig {
            default_chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        assert!(LoaderConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: LoaderConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.mem_cap_bytes, LoaderConfig::default().mem_cap_bytes);
    }
}
