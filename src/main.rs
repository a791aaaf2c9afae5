//! snowline - batch transaction submission toolkit for MultiversX test
//! networks
//!
//! Every operation follows the same protocol: build a transaction, sign it,
//! submit it to the gateway with bounded retry, and poll its status until a
//! terminal state or timeout.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

mod address;
mod cli;
mod config;
mod error;
mod gateway;
mod ops;
mod tx;
mod wallet;

use cli::CliOpts;
use config::Settings;
use gateway::GatewayClient;
use ops::Runner;
use wallet::Ed25519Signer;

#[tokio::main]
async fn main() {
    let opts = CliOpts::parse();
    init_logging(opts.log_file.as_deref());

    info!("Starting snowline v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&opts).await {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(opts: &CliOpts) -> Result<()> {
    let settings = match &opts.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    info!(
        gateway = %settings.network.gateway_url,
        chain_id = %settings.network.chain_id,
        "Loaded configuration"
    );

    let gateway = Arc::new(GatewayClient::new(&settings.network)?);
    let signer = Arc::new(Ed25519Signer::load(&settings.wallet)?);
    let runner = Runner::new(gateway, signer, &settings);

    opts.run_command(&runner).await
}

fn init_logging(log_file: Option<&Path>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,snowline=debug,hyper=warn,reqwest=warn"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true));

    match log_file.map(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
    }) {
        Some(Ok(file)) => {
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .init();
        }
        Some(Err(e)) => {
            registry.init();
            error!("Could not open log file, logging to console only: {}", e);
        }
        None => registry.init(),
    }
}
