//! Error types for the scrapyard rewards ledger.

use uuid::Uuid;

/// Root error type for all ledger and play operations.
///
/// The first three variants are user-facing and leave no state behind.
/// `ConcurrencyConflict` is internal: store implementations that update
/// optimistically retry it inside the ledger and never surface it.
/// `StorageUnavailable` is a retryable service error; a play that failed
/// with it may be resubmitted with the same play id because nothing was
/// committed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("no wallet exists for user {user_id}")]
    UserNotFound { user_id: String },

    #[error("no active board {board_id}")]
    BoardNotFound { board_id: Uuid },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("concurrent update conflict")]
    ConcurrencyConflict,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Convenience type alias for Results
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::UserNotFound {
            user_id: "u-404".to_string(),
        };
        assert!(err.to_string().contains("u-404"));

        let err = LedgerError::InvalidState("board already busted".to_string());
        assert!(err.to_string().contains("board already busted"));
    }
}
