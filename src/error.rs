use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error taxonomy for the ledger.
///
/// `TransientConflict` is internal: the retry layer recovers it and callers
/// only ever see `TooManyRetries` if the conflict persists past the bound.
/// All other variants are definitive and must not be retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("account not found")]
    AccountNotFound,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("account already exists")]
    AlreadyExists,
    #[error("transient serialization conflict")]
    TransientConflict,
    #[error("too many retries")]
    TooManyRetries,
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Whether a fresh attempt of the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientConflict)
    }
}
