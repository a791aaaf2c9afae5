//! High-level on-chain operations
//!
//! Every operation is the same protocol with a different payload: fetch the
//! sender account, sequence a nonce, build, sign, submit with retry, poll
//! until terminal. Call kinds are expressed as payload-construction
//! functions feeding the one shared [`TransactionBuilder`].

use crate::address::{compute_contract_address, Address};
use crate::config::Settings;
use crate::error::ClientResult;
use crate::gateway::NetworkGateway;
use crate::tx::{
    CodeMetadata, ContractCall, NonceSequencer, Payload, SignedTransaction, TransactionBuilder,
    TransactionSender, UnsignedTransaction,
};
use crate::wallet::TransactionSigner;

use std::sync::Arc;
use tracing::{error, info, warn};

/// System contract that issues fungible tokens
pub const TOKEN_ISSUANCE_CONTRACT: &str =
    "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzllls8a5w6u";

/// Fee charged by the issuance contract, in the smallest denomination
pub const TOKEN_ISSUE_COST: u128 = 50_000_000_000_000_000;

/// Hex field identifying the WASM VM in deploy payloads
const VM_TYPE_HEX: &str = "0500";

pub const TOKEN_ISSUE_GAS: u64 = 60_000_000;
pub const SET_ROLE_GAS: u64 = 60_000_000;
pub const ESDT_TRANSFER_GAS: u64 = 500_000;
pub const CONTRACT_CALL_GAS: u64 = 60_000_000;
pub const BURN_GAS: u64 = 100_000_000;
pub const DEPLOY_GAS: u64 = 60_000_000;

/// `issue@nameHex@tickerHex@supplyHex@decimalsHex`
pub fn issue_payload(
    name: &str,
    ticker: &str,
    supply: u128,
    decimals: u32,
) -> ClientResult<Payload> {
    ContractCall::new("issue")
        .arg_str(name)
        .arg_str(ticker)
        .arg_uint(supply)
        .arg_uint(decimals as u128)
        .into_payload()
}

/// `ESDTTransfer@tokenIdHex@amountHex`
pub fn esdt_transfer_payload(token_identifier: &str, amount: u128) -> ClientResult<Payload> {
    ContractCall::new("ESDTTransfer")
        .arg_str(token_identifier)
        .arg_uint(amount)
        .into_payload()
}

/// `setSpecialRole@tokenIdHex@contractAddressHex@roleHex`
pub fn set_special_role_payload(
    token_identifier: &str,
    contract: &Address,
    role: &str,
) -> ClientResult<Payload> {
    ContractCall::new("setSpecialRole")
        .arg_str(token_identifier)
        .arg_bytes(contract.as_bytes())
        .arg_str(role)
        .into_payload()
}

/// `burn_tokens@tokenIdHex@amountHex`
pub fn burn_payload(token_identifier: &str, amount: u128) -> ClientResult<Payload> {
    ContractCall::new("burn_tokens")
        .arg_str(token_identifier)
        .arg_uint(amount)
        .into_payload()
}

/// `claim_tokens@tokenIdHex`
pub fn claim_payload(token_identifier: &str) -> ClientResult<Payload> {
    ContractCall::new("claim_tokens")
        .arg_str(token_identifier)
        .into_payload()
}

/// `codeHex@vmTypeHex@codeMetadataHex[@initArgHex...]`
pub fn deploy_payload(
    code: &[u8],
    metadata: CodeMetadata,
    init_args: &[String],
) -> ClientResult<Payload> {
    let mut call = ContractCall::new(hex::encode(code))
        .arg_hex(VM_TYPE_HEX)
        .arg_hex(metadata.to_hex());
    for arg in init_args {
        call = call.arg_hex(arg.clone());
    }
    call.into_payload()
}

/// `upgradeContract@codeHex@codeMetadataHex`
pub fn upgrade_payload(code: &[u8], metadata: CodeMetadata) -> ClientResult<Payload> {
    ContractCall::new("upgradeContract")
        .arg_bytes(code)
        .arg_hex(metadata.to_hex())
        .into_payload()
}

/// Outcome of a batch submission
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub submitted: usize,
    pub confirmed: usize,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.total - self.confirmed
    }
}

/// Executes operations against one wallet and one gateway
pub struct Runner {
    gateway: Arc<dyn NetworkGateway>,
    signer: Arc<dyn TransactionSigner>,
    builder: TransactionBuilder,
    sender: TransactionSender,
    explorer_url: Option<String>,
}

impl Runner {
    pub fn new(
        gateway: Arc<dyn NetworkGateway>,
        signer: Arc<dyn TransactionSigner>,
        settings: &Settings,
    ) -> Self {
        Self {
            builder: TransactionBuilder::new(
                settings.network.chain_id.clone(),
                settings.network.gas_price,
            ),
            sender: TransactionSender::new(gateway.clone(), &settings.submit),
            gateway,
            signer,
            explorer_url: settings.network.explorer_url.clone(),
        }
    }

    fn sign(&self, unsigned: UnsignedTransaction) -> ClientResult<SignedTransaction> {
        let bytes = unsigned.signing_bytes()?;
        let signature = self.signer.sign(&bytes)?;
        Ok(unsigned.into_signed(signature))
    }

    fn log_explorer_link(&self, tx_hash: &str) {
        if let Some(explorer) = &self.explorer_url {
            info!("Explorer: {}/transactions/{}", explorer, tx_hash);
        }
    }

    /// Submit one transaction and wait for its finalization
    async fn send_single(
        &self,
        receiver: Address,
        value: u128,
        payload: Payload,
        gas_limit: u64,
    ) -> ClientResult<String> {
        let sender_address = self.signer.address();
        let account = self.gateway.fetch_account(&sender_address).await?;
        let mut sequencer = NonceSequencer::from_account(&account);

        let unsigned = self.builder.build(
            sender_address,
            receiver,
            value,
            payload,
            gas_limit,
            sequencer.next(),
        )?;
        let signed = self.sign(unsigned)?;

        let tx_hash = self.sender.send_and_confirm(&signed).await?;
        self.log_explorer_link(&tx_hash);
        Ok(tx_hash)
    }

    /// Issue a fungible token through the system issuance contract
    pub async fn issue_token(
        &self,
        name: &str,
        ticker: &str,
        supply: u128,
        decimals: u32,
    ) -> ClientResult<String> {
        info!(name, ticker, supply, decimals, "Issuing token");
        let receiver = Address::from_bech32(TOKEN_ISSUANCE_CONTRACT)?;
        let payload = issue_payload(name, ticker, supply, decimals)?;
        self.send_single(receiver, TOKEN_ISSUE_COST, payload, TOKEN_ISSUE_GAS)
            .await
    }

    /// Grant a token role (e.g. `ESDTRoleLocalMint`) to a contract.
    ///
    /// Roles are managed by the same system contract that issues tokens;
    /// the target contract is passed as its raw 32-byte address.
    pub async fn set_special_role(
        &self,
        token_identifier: &str,
        contract: Address,
        role: &str,
    ) -> ClientResult<String> {
        info!(token_identifier, %contract, role, "Granting token role");
        let receiver = Address::from_bech32(TOKEN_ISSUANCE_CONTRACT)?;
        let payload = set_special_role_payload(token_identifier, &contract, role)?;
        self.send_single(receiver, 0, payload, SET_ROLE_GAS).await
    }

    /// Distribute a token to many recipients from one account.
    ///
    /// The whole batch is submitted in one pass with locally sequenced
    /// nonces, then every accepted transaction is polled to a terminal
    /// state. A failed item is logged and skipped; its nonce stays
    /// consumed so the remaining transactions keep their positions.
    pub async fn transfer_batch(
        &self,
        token_identifier: &str,
        amount: u128,
        recipients: &[Address],
    ) -> ClientResult<BatchReport> {
        let sender_address = self.signer.address();
        let account = self.gateway.fetch_account(&sender_address).await?;
        let mut sequencer = NonceSequencer::from_account(&account);

        info!(
            sender = %sender_address,
            token_identifier,
            recipients = recipients.len(),
            starting_nonce = sequencer.peek(),
            "Submitting transfer batch"
        );

        let mut report = BatchReport {
            total: recipients.len(),
            ..BatchReport::default()
        };
        let mut accepted: Vec<String> = Vec::with_capacity(recipients.len());

        for (index, recipient) in recipients.iter().enumerate() {
            let nonce = sequencer.next();
            let result = async {
                let payload = esdt_transfer_payload(token_identifier, amount)?;
                let unsigned = self.builder.build(
                    sender_address,
                    *recipient,
                    0,
                    payload,
                    ESDT_TRANSFER_GAS,
                    nonce,
                )?;
                let signed = self.sign(unsigned)?;
                self.sender.submit_with_retry(&signed).await
            }
            .await;

            match result {
                Ok(tx_hash) => {
                    info!(
                        item = index + 1,
                        total = recipients.len(),
                        recipient = %recipient,
                        nonce,
                        %tx_hash,
                        "Transfer submitted"
                    );
                    report.submitted += 1;
                    accepted.push(tx_hash);
                }
                Err(e) => {
                    error!(
                        item = index + 1,
                        recipient = %recipient,
                        nonce,
                        error = %e,
                        "Transfer not accepted, continuing with next recipient"
                    );
                }
            }
        }

        info!(
            submitted = report.submitted,
            "Waiting for submitted transfers to finalize"
        );
        for tx_hash in &accepted {
            match self.sender.poller().wait_for_completion(tx_hash).await {
                Ok(_) => report.confirmed += 1,
                Err(e) => warn!(%tx_hash, error = %e, "Transfer did not finalize"),
            }
        }

        info!(
            total = report.total,
            confirmed = report.confirmed,
            failed = report.failed(),
            "Transfer batch complete"
        );
        Ok(report)
    }

    /// Burn tokens held by a contract: transfer the amount in, then call
    /// the burn endpoint. Each step is finalized before the next.
    pub async fn burn_tokens(
        &self,
        contract: Address,
        token_identifier: &str,
        amount: u128,
    ) -> ClientResult<(String, String)> {
        info!(%contract, token_identifier, amount, "Transferring tokens into contract for burn");
        let transfer_hash = self
            .send_single(
                contract,
                0,
                esdt_transfer_payload(token_identifier, amount)?,
                BURN_GAS,
            )
            .await?;

        info!(%contract, token_identifier, amount, "Calling burn endpoint");
        let burn_hash = self
            .send_single(contract, 0, burn_payload(token_identifier, amount)?, BURN_GAS)
            .await?;

        Ok((transfer_hash, burn_hash))
    }

    /// Claim tokens held by a contract
    pub async fn claim_tokens(
        &self,
        contract: Address,
        token_identifier: &str,
    ) -> ClientResult<String> {
        info!(%contract, token_identifier, "Claiming tokens");
        self.send_single(
            contract,
            0,
            claim_payload(token_identifier)?,
            CONTRACT_CALL_GAS,
        )
        .await
    }

    /// Deploy a WASM contract and return (tx hash, deployed address).
    ///
    /// The deployed address is derived from the owner and the deployment
    /// nonce, so it is computed before finalization and verified by it.
    pub async fn deploy_contract(
        &self,
        code: &[u8],
        metadata: CodeMetadata,
        init_args: &[String],
    ) -> ClientResult<(String, Address)> {
        let sender_address = self.signer.address();
        let account = self.gateway.fetch_account(&sender_address).await?;
        let mut sequencer = NonceSequencer::from_account(&account);
        let deployment_nonce = sequencer.next();

        let contract_address = compute_contract_address(&sender_address, deployment_nonce);
        info!(
            owner = %sender_address,
            nonce = deployment_nonce,
            contract = %contract_address,
            code_len = code.len(),
            "Deploying contract"
        );

        let unsigned = self.builder.build(
            sender_address,
            Address::system_deploy(),
            0,
            deploy_payload(code, metadata, init_args)?,
            DEPLOY_GAS,
            deployment_nonce,
        )?;
        let signed = self.sign(unsigned)?;

        let tx_hash = self.sender.send_and_confirm(&signed).await?;
        self.log_explorer_link(&tx_hash);
        info!(contract = %contract_address, "Contract deployed");
        Ok((tx_hash, contract_address))
    }

    /// Upgrade a deployed contract's code in place
    pub async fn upgrade_contract(
        &self,
        contract: Address,
        code: &[u8],
        metadata: CodeMetadata,
    ) -> ClientResult<String> {
        info!(%contract, code_len = code.len(), "Upgrading contract");
        self.send_single(contract, 0, upgrade_payload(code, metadata)?, DEPLOY_GAS)
            .await
    }
}
