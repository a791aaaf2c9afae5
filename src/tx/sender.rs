//! Transaction submission with bounded retry
//!
//! Transient network errors are retried with a fixed backoff, up to the
//! configured attempt count. An explicit rejection by the network (bad
//! nonce, bad signature, insufficient funds) is permanent: retrying the same
//! transaction cannot succeed, so it is surfaced immediately.

use super::builder::SignedTransaction;
use super::poller::FinalizationPoller;
use crate::config::SubmitConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::NetworkGateway;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Submits signed transactions and waits for their finalization
pub struct TransactionSender {
    gateway: Arc<dyn NetworkGateway>,
    poller: FinalizationPoller,
    max_attempts: u32,
    backoff: Duration,
}

impl TransactionSender {
    pub fn new(gateway: Arc<dyn NetworkGateway>, config: &SubmitConfig) -> Self {
        Self {
            poller: FinalizationPoller::new(gateway.clone(), config),
            gateway,
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Submit a signed transaction, retrying transient failures
    pub async fn submit_with_retry(&self, tx: &SignedTransaction) -> ClientResult<String> {
        let mut attempts = 0;
        let mut last_error: Option<ClientError> = None;

        while attempts < self.max_attempts {
            attempts += 1;

            match self.gateway.send_transaction(tx).await {
                Ok(tx_hash) => {
                    info!(
                        %tx_hash,
                        nonce = tx.tx.nonce,
                        attempt = attempts,
                        max_attempts = self.max_attempts,
                        "Transaction sent"
                    );
                    return Ok(tx_hash);
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        nonce = tx.tx.nonce,
                        attempt = attempts,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Transient send failure"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    error!(nonce = tx.tx.nonce, error = %e, "Transaction rejected");
                    return Err(e);
                }
            }

            if attempts < self.max_attempts {
                sleep(self.backoff).await;
            }
        }

        Err(ClientError::SubmissionExhausted {
            attempts: self.max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Submit and block until the transaction is finalized successfully
    pub async fn send_and_confirm(&self, tx: &SignedTransaction) -> ClientResult<String> {
        let tx_hash = self.submit_with_retry(tx).await?;
        self.poller.wait_for_completion(&tx_hash).await?;
        Ok(tx_hash)
    }

    pub fn poller(&self) -> &FinalizationPoller {
        &self.poller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::gateway::{MockNetworkGateway, TransactionStatus};
    use crate::tx::builder::TransactionBuilder;
    use crate::tx::payload::Payload;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn signed_tx() -> SignedTransaction {
        let sender =
            Address::from_hex("0139472eff6886771a982f3083da5d421f24c29181e63888228dc81ca60d69e1")
                .unwrap();
        TransactionBuilder::new("D", 1_000_000_000)
            .build(sender, sender, 1, Payload::empty(), 50_000, 10)
            .unwrap()
            .into_signed(vec![0u8; 64])
    }

    fn config(max_attempts: u32) -> SubmitConfig {
        SubmitConfig {
            max_attempts,
            retry_backoff_ms: 1000,
            initial_delay_secs: 2,
            poll_interval_secs: 5,
            poll_timeout_secs: 60,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut gateway = MockNetworkGateway::new();
        gateway.expect_send_transaction().returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(ClientError::network("send transaction", "timed out")),
                _ => Ok("deadbeef".to_string()),
            }
        });

        let sender = TransactionSender::new(Arc::new(gateway), &config(5));
        let tx_hash = sender.submit_with_retry(&signed_tx()).await.unwrap();

        assert_eq!(tx_hash, "deadbeef");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_is_not_retried() {
        let mut gateway = MockNetworkGateway::new();
        gateway.expect_send_transaction().times(1).returning(|_| {
            Err(ClientError::Submission {
                response: "lowerNonceInTx: true".to_string(),
            })
        });

        let sender = TransactionSender::new(Arc::new(gateway), &config(5));
        let err = sender.submit_with_retry(&signed_tx()).await.unwrap_err();
        assert!(matches!(err, ClientError::Submission { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_max_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut gateway = MockNetworkGateway::new();
        gateway.expect_send_transaction().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::network("send transaction", "connection refused"))
        });

        let sender = TransactionSender::new(Arc::new(gateway), &config(3));
        let err = sender.submit_with_retry(&signed_tx()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::SubmissionExhausted { attempts: 3, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_and_confirm_polls_to_success() {
        let mut gateway = MockNetworkGateway::new();
        gateway
            .expect_send_transaction()
            .times(1)
            .returning(|_| Ok("deadbeef".to_string()));
        gateway
            .expect_transaction_status()
            .times(1)
            .returning(|_| Ok(TransactionStatus::Success));

        let sender = TransactionSender::new(Arc::new(gateway), &config(5));
        let tx_hash = sender.send_and_confirm(&signed_tx()).await.unwrap();
        assert_eq!(tx_hash, "deadbeef");
    }
}
