use thiserror::Error;

/// Result type local to sieve-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        path: String,
        line: Option<u64>,
        message: String,
    },

    #[error("{path}: missing header row")]
    MissingHeader { path: String },

    #[error("serialize: {0}")]
    Serialize(String),

    #[error(transparent)]
    Core(#[from] sieve_core::Error),
}

impl Error {
    /// Map a `csv` error for `path`, keeping transport failures apart from
    /// content failures.
    pub(crate) fn from_csv(path: &str, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Error::Io {
                path: path.to_string(),
                source,
            },
            _ => Error::Parse {
                path: path.to_string(),
                line,
                message,
            },
        }
    }

    pub(crate) fn io(path: &str, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}
