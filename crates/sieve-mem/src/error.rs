use thiserror::Error;

/// Result type local to sieve-mem.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A reservation would cross the cap; `used` is the level at refusal time.
    #[error("'{tag}' needs {requested} bytes but only {} of {capacity} are free", capacity.saturating_sub(*used))]
    BudgetExceeded {
        tag: &'static str,
        requested: usize,
        capacity: usize,
        used: usize,
    },
}
