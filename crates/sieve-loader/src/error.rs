use thiserror::Error;

/// Result type local to sieve-loader.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Message surfaced when the full read does not fit and no sample rate was given.
pub const NEED_SAMPLE_FRAC: &str = "file too large to load in memory; provide sample_frac";

/// Everything a load can fail with. Running out of budget on the full read is
/// not in this list: it is recovered by sampling, and only shows up as
/// `Configuration` when there is no sample rate to fall back on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path}{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        path: String,
        line: Option<u64>,
        message: String,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Core(sieve_core::Error),
}

impl From<sieve_io::Error> for LoadError {
    fn from(e: sieve_io::Error) -> Self {
        match e {
            sieve_io::Error::Io { path, source } => LoadError::Io { path, source },
            sieve_io::Error::Parse {
                path,
                line,
                message,
            } => LoadError::Parse {
                path,
                line,
                message,
            },
            sieve_io::Error::MissingHeader { path } => LoadError::Parse {
                path,
                line: None,
                message: "missing header row".into(),
            },
            sieve_io::Error::Serialize(msg) => {
                LoadError::Core(sieve_core::Error::Invariant(msg))
            }
            sieve_io::Error::Core(inner) => inner.into(),
        }
    }
}

impl From<sieve_core::Error> for LoadError {
    fn from(e: sieve_core::Error) -> Self {
        match e {
            sieve_core::Error::Config(msg) => LoadError::Configuration(msg),
            other => LoadError::Core(other),
        }
    }
}

impl LoadError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, LoadError::Configuration(_))
    }
}
