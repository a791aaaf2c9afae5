//! HTTP gateway client
//!
//! Thin wrapper over the network gateway's REST interface. Transport
//! failures, server-side (5xx) errors and rate limiting (429) map to
//! transient network errors; any other 4xx rejection of a submitted
//! transaction maps to a permanent submission error carrying the raw
//! server response.

use super::{Account, NetworkGateway, TransactionStatus};
use crate::address::Address;
use crate::config::NetworkConfig;
use crate::error::{ClientError, ClientResult};
use crate::tx::SignedTransaction;

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// REST client for the network gateway
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    nonce: u64,
    balance: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

impl GatewayClient {
    pub fn new(config: &NetworkConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        url: String,
    ) -> ClientResult<T> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::network(operation, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| ClientError::network(operation, e))?;

        response
            .json()
            .await
            .map_err(|e| ClientError::network(operation, e))
    }
}

/// Rate limiting is transient and must reach the retry loop; any other 4xx
/// is an explicit rejection of the transaction itself.
fn classify_send_failure(status: reqwest::StatusCode, body: String) -> ClientError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ClientError::network(
            "send transaction",
            format!("gateway returned {}: {}", status, body),
        );
    }
    if status.is_client_error() {
        return ClientError::Submission { response: body };
    }
    ClientError::network("send transaction", format!("gateway returned {}", status))
}

#[async_trait]
impl NetworkGateway for GatewayClient {
    async fn fetch_account(&self, address: &Address) -> ClientResult<Account> {
        let url = format!("{}/accounts/{}", self.base_url, address.to_bech32());
        let body: AccountResponse = self.get_json("get account", url).await?;

        let balance = body
            .balance
            .parse::<u128>()
            .map_err(|e| ClientError::network("get account", format!("bad balance: {}", e)))?;

        debug!(%address, nonce = body.nonce, balance, "Fetched account");

        Ok(Account {
            address: *address,
            nonce: body.nonce,
            balance,
        })
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> ClientResult<String> {
        let url = format!("{}/transaction/send", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(tx)
            .send()
            .await
            .map_err(|e| ClientError::network("send transaction", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_send_failure(status, body));
        }

        let body: SendResponse = response
            .json()
            .await
            .map_err(|e| ClientError::network("send transaction", e))?;
        Ok(body.tx_hash)
    }

    async fn transaction_status(&self, tx_hash: &str) -> ClientResult<TransactionStatus> {
        let url = format!(
            "{}/transaction/{}?withProcessStatus=true",
            self.base_url, tx_hash
        );
        let body: StatusResponse = self.get_json("get transaction status", url).await?;
        Ok(TransactionStatus::from_label(&body.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_response_shape() {
        let body: AccountResponse = serde_json::from_str(
            r#"{"address":"erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th",
                "nonce":12,"balance":"1500000000000000000","shard":1}"#,
        )
        .unwrap();
        assert_eq!(body.nonce, 12);
        assert_eq!(body.balance.parse::<u128>().unwrap(), 1_500_000_000_000_000_000);
    }

    #[test]
    fn test_send_response_shape() {
        let body: SendResponse =
            serde_json::from_str(r#"{"txHash":"4fa19e1c07a2a16b0d277bd7cb3ff9a059d9a2a1a7e0ff"}"#)
                .unwrap();
        assert!(body.tx_hash.starts_with("4fa19e1c"));
    }

    #[test]
    fn test_rate_limited_send_is_retryable() {
        let err = classify_send_failure(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "too many requests".to_string(),
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_rejected_send_is_permanent() {
        let err = classify_send_failure(
            reqwest::StatusCode::BAD_REQUEST,
            "invalid signature".to_string(),
        );
        assert!(!err.is_retryable());
        assert!(matches!(err, ClientError::Submission { ref response } if response == "invalid signature"));
    }

    #[test]
    fn test_server_error_send_is_retryable() {
        let err = classify_send_failure(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            String::new(),
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_status_response_shape() {
        let body: StatusResponse =
            serde_json::from_str(r#"{"status":"success","processStatus":"success"}"#).unwrap();
        assert_eq!(
            TransactionStatus::from_label(&body.status),
            TransactionStatus::Success
        );
    }
}
