// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trapwatch::app::config::GlobalSettings;
use trapwatch::app::logging::setup_logging;
use trapwatch::domain::error::AppError;
use trapwatch::infrastructure::network::client::{ChainClient, RpcChainClient};
use trapwatch::infrastructure::network::provider::ConnectionFactory;
use trapwatch::infrastructure::network::trap::{RpcTrapOracle, TrapOracle};
use trapwatch::services::watch::evaluator::TrapEvaluator;
use trapwatch::services::watch::filter::CandidateFilter;
use trapwatch::services::watch::sweep::{SweepBuilder, SweepConfig};
use trapwatch::services::watch::watcher::{WatchTimings, Watcher};

#[derive(Parser, Debug)]
#[command(author, version, about = "trapwatch canary responder")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Sign and log the sweep without broadcasting
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(settings.log_level(), settings.log_json);

    let signer = PrivateKeySigner::from_str(&settings.wallet_key)
        .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))?;
    let monitored = signer.address();

    let (stream_provider, http_provider) = ConnectionFactory::preferred(
        settings.websocket_provider.as_deref(),
        &settings.http_provider,
    )
    .await?;

    let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(
        stream_provider,
        http_provider.clone(),
        settings.rpc_timeout(),
    ));
    let trap: Arc<dyn TrapOracle> = Arc::new(RpcTrapOracle::new(
        http_provider,
        settings.trap_address,
        signer.clone(),
        settings.rpc_timeout(),
    ));

    // The deployed contract must be bound to the wallet this process holds
    // the key for.
    let bound = trap.monitored_wallet().await?;
    if bound != monitored {
        return Err(AppError::Config(format!(
            "trap contract monitors {bound}, but wallet key derives {monitored}"
        )));
    }
    tracing::info!(target: "startup", wallet = %monitored, trap = %settings.trap_address, "Identity verified against trap contract");

    if cli.dry_run {
        tracing::info!(target: "startup", "Dry-run: skipping on-chain updateNonce()");
    } else {
        let hash = trap
            .update_nonce()
            .await
            .map_err(|e| AppError::Initialization(format!("updateNonce() failed: {}", e)))?;
        tracing::info!(target: "startup", tx_hash = %hash, "Synchronized trap nonce bookkeeping");
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!(target: "startup", "Ctrl-C received; shutting down");
                shutdown.cancel();
            }
        });
    }

    let filter = CandidateFilter::new(client.clone(), monitored);
    let evaluator = TrapEvaluator::new(trap.clone());
    let sweep = SweepBuilder::new(
        client.clone(),
        trap,
        signer,
        monitored,
        SweepConfig {
            margin_wei: U256::from(settings.sweep_margin_wei),
            gas_limit: settings.sweep_gas_limit,
            gas_price_multiplier: settings.gas_price_multiplier,
        },
        cli.dry_run,
    );
    let mut watcher = Watcher::new(
        client,
        filter,
        evaluator,
        sweep,
        monitored,
        WatchTimings {
            poll_interval: settings.poll_interval(),
            idle_delay: settings.idle_delay(),
        },
        shutdown,
    );
    watcher.run().await
}
