//! Ledger error taxonomy

use uuid::Uuid;

/// Errors surfaced by ledger operations.
///
/// Every mutating operation checks its preconditions inside the storage
/// transaction, so any of these leaves the database untouched.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("player {user_id} is already signed up for game {game_id}")]
    DuplicateSignup { game_id: Uuid, user_id: Uuid },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transaction failed: {0}")]
    TransactionFailure(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
