use agora_types::U256;
use thiserror::Error;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Amount must be nonzero")]
    ZeroAmount,

    #[error("Invalid recipient: zero address")]
    InvalidRecipient,

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: U256, need: U256 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientBalance {
            have: U256::from(5u64),
            need: U256::from(10u64),
        };
        assert!(err.to_string().contains("have 5"));
        assert!(err.to_string().contains("need 10"));
    }
}
