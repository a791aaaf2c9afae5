//! Error types for the snowline toolkit

use thiserror::Error;

/// Main error type for gateway and transaction operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Address error: {0}")]
    Address(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error during {operation}: {message}")]
    Network { operation: String, message: String },

    #[error("Transaction rejected by the network: {response}")]
    Submission { response: String },

    #[error("Submission exhausted after {attempts} attempts: {last_error}")]
    SubmissionExhausted { attempts: u32, last_error: String },

    #[error("Transaction {tx_hash} failed with status {status}")]
    TransactionFailed { tx_hash: String, status: String },

    #[error("Transaction {tx_hash} not finalized within {timeout_secs}s")]
    TransactionTimeout { tx_hash: String, timeout_secs: u64 },
}

impl ClientError {
    /// Check if error is transient and worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Network { .. })
    }

    pub fn network(operation: impl Into<String>, message: impl ToString) -> Self {
        ClientError::Network {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ClientError::network("send transaction", "connection refused").is_retryable());
        assert!(!ClientError::Submission {
            response: "invalid signature".to_string()
        }
        .is_retryable());
        assert!(!ClientError::Validation("gas limit must be positive".to_string()).is_retryable());
    }
}
