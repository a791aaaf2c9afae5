//! Gateway module - account and transaction access to the network
//!
//! The poller and sender only ever talk to the network through the
//! [`NetworkGateway`] trait so they can be exercised against mocks.

pub mod http;

pub use http::GatewayClient;

use crate::address::Address;
use crate::error::ClientResult;
use crate::tx::SignedTransaction;

use async_trait::async_trait;
use std::fmt;

/// One on-chain identity as reported by the gateway
#[derive(Debug, Clone)]
pub struct Account {
    pub address: Address,
    /// Next sequence number the network expects from this account
    pub nonce: u64,
    /// Balance in the smallest denomination
    pub balance: u128,
}

/// Status of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Invalid,
}

impl TransactionStatus {
    /// Map a gateway status label onto the status enum. Unknown labels are
    /// treated as still in flight; the gateway reports several transient
    /// labels ("received", "partially-executed") before settling.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "success" | "successful" | "executed" => TransactionStatus::Success,
            "fail" | "failed" | "unsuccessful" => TransactionStatus::Failed,
            "invalid" => TransactionStatus::Invalid,
            _ => TransactionStatus::Pending,
        }
    }

    /// Whether no further state change will occur
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, TransactionStatus::Success)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Invalid => "invalid",
        };
        f.write_str(label)
    }
}

/// Network access used by every higher-level operation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkGateway: Send + Sync {
    /// Fetch an account's current nonce and balance
    async fn fetch_account(&self, address: &Address) -> ClientResult<Account>;

    /// Submit a signed transaction, returning its content-derived hash
    async fn send_transaction(&self, tx: &SignedTransaction) -> ClientResult<String>;

    /// Look up the current status of a submitted transaction
    async fn transaction_status(&self, tx_hash: &str) -> ClientResult<TransactionStatus>;
}
