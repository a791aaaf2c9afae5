//! Command-line surface
//!
//! Each subcommand maps onto one high-level operation; they all share the
//! same wallet, gateway and submission configuration.

use crate::address::Address;
use crate::ops::Runner;
use crate::tx::CodeMetadata;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "snowline",
    about = "Batch transaction submission toolkit for MultiversX test networks",
    version
)]
pub struct CliOpts {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Append log output to this file in addition to the console
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Commands
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue a fungible token through the system issuance contract
    Issue {
        #[arg(long)]
        name: String,
        #[arg(long)]
        ticker: String,
        /// Total supply in the smallest denomination
        #[arg(long)]
        supply: u128,
        #[arg(long, default_value_t = 8)]
        decimals: u32,
    },
    /// Grant a token role to a contract so it can mint and burn locally
    SetRole {
        #[arg(long)]
        token_identifier: String,
        /// Contract receiving the role
        #[arg(long)]
        contract: String,
        #[arg(long, default_value = "ESDTRoleLocalMint")]
        role: String,
    },
    /// Distribute a token to every address in a recipients file
    Transfer {
        #[arg(long)]
        token_identifier: String,
        /// Amount per recipient in the smallest denomination
        #[arg(long)]
        amount: u128,
        /// JSON file holding an array of bech32 addresses
        #[arg(long)]
        recipients_file: PathBuf,
    },
    /// Burn tokens by transferring them into a contract and calling its burn endpoint
    Burn {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        token_identifier: String,
        #[arg(long)]
        amount: u128,
    },
    /// Claim tokens held by a contract
    Claim {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        token_identifier: String,
    },
    /// Deploy a WASM contract
    Deploy {
        #[arg(long)]
        wasm_path: PathBuf,
        /// Mark the contract as payable
        #[arg(long)]
        payable: bool,
        /// Pre-encoded hex init arguments, repeatable
        #[arg(long = "init-arg")]
        init_args: Vec<String>,
    },
    /// Upgrade a deployed contract's code
    Upgrade {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        wasm_path: PathBuf,
    },
}

impl CliOpts {
    pub async fn run_command(&self, runner: &Runner) -> anyhow::Result<()> {
        match &self.command {
            Command::Issue {
                name,
                ticker,
                supply,
                decimals,
            } => {
                let tx_hash = runner.issue_token(name, ticker, *supply, *decimals).await?;
                info!(%tx_hash, %ticker, "Token issued");
            }
            Command::SetRole {
                token_identifier,
                contract,
                role,
            } => {
                let contract = Address::from_bech32(contract)?;
                let tx_hash = runner
                    .set_special_role(token_identifier, contract, role)
                    .await?;
                info!(%tx_hash, %role, "Role granted");
            }
            Command::Transfer {
                token_identifier,
                amount,
                recipients_file,
            } => {
                let recipients = load_recipients(recipients_file)?;
                let report = runner
                    .transfer_batch(token_identifier, *amount, &recipients)
                    .await?;
                if report.failed() > 0 {
                    warn!(
                        confirmed = report.confirmed,
                        failed = report.failed(),
                        "Batch finished with failures"
                    );
                }
            }
            Command::Burn {
                contract,
                token_identifier,
                amount,
            } => {
                let contract = Address::from_bech32(contract)?;
                let (transfer_hash, burn_hash) = runner
                    .burn_tokens(contract, token_identifier, *amount)
                    .await?;
                info!(%transfer_hash, %burn_hash, "Tokens burned");
            }
            Command::Claim {
                contract,
                token_identifier,
            } => {
                let contract = Address::from_bech32(contract)?;
                let tx_hash = runner.claim_tokens(contract, token_identifier).await?;
                info!(%tx_hash, "Tokens claimed");
            }
            Command::Deploy {
                wasm_path,
                payable,
                init_args,
            } => {
                let code = std::fs::read(wasm_path)
                    .with_context(|| format!("Failed to read WASM file {:?}", wasm_path))?;
                let metadata = CodeMetadata {
                    payable: *payable,
                    ..CodeMetadata::default()
                };
                let (tx_hash, contract) =
                    runner.deploy_contract(&code, metadata, init_args).await?;
                info!(%tx_hash, contract = %contract, "Contract deployed");
            }
            Command::Upgrade {
                contract,
                wasm_path,
            } => {
                let contract = Address::from_bech32(contract)?;
                let code = std::fs::read(wasm_path)
                    .with_context(|| format!("Failed to read WASM file {:?}", wasm_path))?;
                let tx_hash = runner
                    .upgrade_contract(contract, &code, CodeMetadata::default())
                    .await?;
                info!(%tx_hash, "Contract upgraded");
            }
        }
        Ok(())
    }
}

fn load_recipients(path: &PathBuf) -> anyhow::Result<Vec<Address>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipients file {:?}", path))?;
    let entries: Vec<String> =
        serde_json::from_str(&contents).with_context(|| "Recipients file must be a JSON array")?;

    let mut recipients = Vec::with_capacity(entries.len());
    for entry in &entries {
        recipients.push(Address::from_bech32(entry)?);
    }
    Ok(recipients)
}
