//! Finalization polling
//!
//! After submission a transaction is in the Pending state. The poller
//! queries the gateway on a fixed interval until it observes a terminal
//! status (Success, Failed, Invalid) or the caller-supplied timeout elapses
//! (TimedOut). A short initial delay before the first poll avoids querying
//! before the gateway has indexed the transaction. Network errors while
//! polling do not change state; they are logged and the poll is retried on
//! the next interval, bounded by the same overall timeout.

use crate::config::SubmitConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{NetworkGateway, TransactionStatus};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Polls a submitted transaction until it reaches a terminal state
pub struct FinalizationPoller {
    gateway: Arc<dyn NetworkGateway>,
    initial_delay: Duration,
    interval: Duration,
    timeout: Duration,
}

impl FinalizationPoller {
    pub fn new(gateway: Arc<dyn NetworkGateway>, config: &SubmitConfig) -> Self {
        Self {
            gateway,
            initial_delay: Duration::from_secs(config.initial_delay_secs),
            interval: Duration::from_secs(config.poll_interval_secs),
            timeout: Duration::from_secs(config.poll_timeout_secs),
        }
    }

    /// Wait until the transaction is finalized.
    ///
    /// Returns the terminal status on success; fails with
    /// [`ClientError::TransactionFailed`] when the network executed the
    /// transaction unsuccessfully or marked it invalid, and with
    /// [`ClientError::TransactionTimeout`] when it stays pending past the
    /// configured timeout.
    pub async fn wait_for_completion(&self, tx_hash: &str) -> ClientResult<TransactionStatus> {
        let started = Instant::now();
        sleep(self.initial_delay).await;

        loop {
            match self.gateway.transaction_status(tx_hash).await {
                Ok(TransactionStatus::Success) => {
                    info!(tx_hash, "Transaction successfully finalized");
                    return Ok(TransactionStatus::Success);
                }
                Ok(status @ (TransactionStatus::Failed | TransactionStatus::Invalid)) => {
                    warn!(tx_hash, %status, "Transaction reached terminal failure");
                    return Err(ClientError::TransactionFailed {
                        tx_hash: tx_hash.to_string(),
                        status: status.to_string(),
                    });
                }
                Ok(TransactionStatus::Pending) => {
                    debug!(tx_hash, "Transaction still pending");
                }
                // Transient gateway trouble does not change poll state
                Err(e) if e.is_retryable() => {
                    warn!(tx_hash, error = %e, "Status poll failed, will retry");
                }
                Err(e) => return Err(e),
            }

            if started.elapsed() >= self.timeout {
                warn!(
                    tx_hash,
                    timeout_secs = self.timeout.as_secs(),
                    "Transaction not finalized within timeout"
                );
                return Err(ClientError::TransactionTimeout {
                    tx_hash: tx_hash.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }

            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockNetworkGateway;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(timeout_secs: u64) -> SubmitConfig {
        SubmitConfig {
            max_attempts: 5,
            retry_backoff_ms: 1000,
            initial_delay_secs: 2,
            poll_interval_secs: 5,
            poll_timeout_secs: timeout_secs,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_poll() {
        let mut gateway = MockNetworkGateway::new();
        gateway
            .expect_transaction_status()
            .times(1)
            .returning(|_| Ok(TransactionStatus::Success));

        let poller = FinalizationPoller::new(Arc::new(gateway), &config(60));
        let status = poller.wait_for_completion("abc123").await.unwrap();
        assert_eq!(status, TransactionStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_while_pending() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let mut gateway = MockNetworkGateway::new();
        gateway.expect_transaction_status().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(TransactionStatus::Pending)
        });

        let poller = FinalizationPoller::new(Arc::new(gateway), &config(10));
        let err = poller.wait_for_completion("abc123").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::TransactionTimeout {
                timeout_secs: 10,
                ..
            }
        ));
        // Polls at t=2s and t=7s, then the t=12s poll observes the timeout
        let observed = polls.load(Ordering::SeqCst);
        assert!((2..=3).contains(&observed), "got {} polls", observed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_is_surfaced() {
        let mut gateway = MockNetworkGateway::new();
        gateway
            .expect_transaction_status()
            .times(1)
            .returning(|_| Ok(TransactionStatus::Invalid));

        let poller = FinalizationPoller::new(Arc::new(gateway), &config(60));
        let err = poller.wait_for_completion("abc123").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::TransactionFailed { ref status, .. } if status == "invalid"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_do_not_change_state() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let mut gateway = MockNetworkGateway::new();
        gateway.expect_transaction_status().returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(ClientError::network("get status", "connection reset")),
                _ => Ok(TransactionStatus::Success),
            }
        });

        let poller = FinalizationPoller::new(Arc::new(gateway), &config(60));
        let status = poller.wait_for_completion("abc123").await.unwrap();
        assert_eq!(status, TransactionStatus::Success);
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }
}
