// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::network::client::{ChainClient, NonceTag};
use crate::network::trap::TrapOracle;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SweepConfig {
    /// Wei left behind to cover the sweep's own gas.
    pub margin_wei: U256,
    pub gas_limit: u64,
    /// Applied to the live network gas price; validated ≥ 2 at config load.
    pub gas_price_multiplier: u64,
}

/// Builds, signs, and broadcasts the fund sweep. Every trigger gets exactly
/// one submission attempt; failures are reported, never retried.
pub struct SweepBuilder {
    client: Arc<dyn ChainClient>,
    trap: Arc<dyn TrapOracle>,
    signer: PrivateKeySigner,
    monitored: Address,
    config: SweepConfig,
    dry_run: bool,
}

impl SweepBuilder {
    pub fn new(
        client: Arc<dyn ChainClient>,
        trap: Arc<dyn TrapOracle>,
        signer: PrivateKeySigner,
        monitored: Address,
        config: SweepConfig,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            trap,
            signer,
            monitored,
            config,
            dry_run,
        }
    }

    pub async fn submit(&self, payload: Bytes) -> Result<B256, AppError> {
        // The vault is expected to be static, but tolerate it moving: fetch
        // fresh on every sweep.
        let vault = self.trap.safe_vault().await?;

        let balance = self.client.balance(self.monitored).await?;
        if balance <= self.config.margin_wei {
            return Err(AppError::InsufficientFunds {
                required: format!("> {} wei", self.config.margin_wei),
                available: balance.to_string(),
            });
        }
        let value = balance - self.config.margin_wei;

        // Outbid the racing transaction for the same nonce slot.
        let gas_price = self
            .client
            .gas_price()
            .await?
            .saturating_mul(self.config.gas_price_multiplier as u128);

        let nonce = self
            .client
            .transaction_count(self.monitored, NonceTag::Pending)
            .await?;
        let chain_id = self.client.chain_id().await?;

        let mut tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit: self.config.gas_limit,
            to: TxKind::Call(vault),
            value,
            input: payload,
        };
        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx).map_err(|e| {
            AppError::Transaction {
                hash: "<unsigned>".into(),
                reason: format!("signing failed: {e}"),
            }
        })?;
        let signed = tx.into_signed(sig);
        let hash = *signed.hash();
        let envelope: TxEnvelope = signed.into();
        let raw = envelope.encoded_2718();

        if self.dry_run {
            tracing::info!(
                target: "sweep",
                tx_hash = %hash,
                to = %vault,
                value = %value,
                nonce,
                gas_price,
                "Dry-run: would broadcast sweep"
            );
            return Ok(hash);
        }

        let submitted = self.client.send_raw_transaction(&raw).await?;
        tracing::info!(
            target: "sweep",
            tx_hash = %submitted,
            to = %vault,
            value = %value,
            nonce,
            gas_price,
            chain_id,
            "Sweep broadcast"
        );
        Ok(submitted)
    }
}
