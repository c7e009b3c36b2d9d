// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::domain::constants::UPDATE_NONCE_GAS_LIMIT;
use crate::infrastructure::data::trap_abi::WalletTrap;
use crate::network::provider::HttpProvider;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, Bytes, TxKind, U256};
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;

/// Protective-contract boundary. The watch loop consults it for observations,
/// verdicts, and the sweep destination; tests substitute a scripted oracle.
#[async_trait]
pub trait TrapOracle: Send + Sync {
    /// Opaque observation of current on-chain state relevant to the trap.
    async fn collect(&self) -> Result<Bytes, AppError>;

    /// Verdict over an observation: whether to respond, and with what payload.
    async fn analyze(&self, observation: Bytes) -> Result<(bool, Bytes), AppError>;

    /// Current sweep destination. Queried fresh per sweep, never cached.
    async fn safe_vault(&self) -> Result<Address, AppError>;

    /// The wallet the deployed contract is bound to.
    async fn monitored_wallet(&self) -> Result<Address, AppError>;

    /// State-changing bookkeeping call, invoked once at startup.
    async fn update_nonce(&self) -> Result<B256, AppError>;
}

pub struct RpcTrapOracle {
    provider: HttpProvider,
    address: Address,
    signer: PrivateKeySigner,
    call_timeout: Duration,
}

impl RpcTrapOracle {
    pub fn new(
        provider: HttpProvider,
        address: Address,
        signer: PrivateKeySigner,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            address,
            signer,
            call_timeout,
        }
    }

    fn contract(&self) -> WalletTrap::WalletTrapInstance<HttpProvider> {
        WalletTrap::new(self.address, self.provider.clone())
    }
}

#[async_trait]
impl TrapOracle for RpcTrapOracle {
    async fn collect(&self) -> Result<Bytes, AppError> {
        let contract = self.contract();
        match timeout(self.call_timeout, async { contract.collect().call().await }).await {
            Ok(res) => res.map_err(|e| AppError::Evaluation(format!("collect() reverted: {e}"))),
            Err(_) => Err(AppError::Evaluation(format!(
                "collect() timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    async fn analyze(&self, observation: Bytes) -> Result<(bool, Bytes), AppError> {
        let contract = self.contract();
        let call = async { contract.analyze(observation).call().await };
        match timeout(self.call_timeout, call).await {
            Ok(Ok(ret)) => Ok((ret.shouldRespond, ret.responseData)),
            Ok(Err(e)) => Err(AppError::Evaluation(format!("analyze() reverted: {e}"))),
            Err(_) => Err(AppError::Evaluation(format!(
                "analyze() timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    async fn safe_vault(&self) -> Result<Address, AppError> {
        let contract = self.contract();
        match timeout(self.call_timeout, async { contract.safeVault().call().await }).await {
            Ok(res) => res.map_err(|e| AppError::Connection(format!("safeVault() failed: {e}"))),
            Err(_) => Err(AppError::Connection(format!(
                "safeVault() timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    async fn monitored_wallet(&self) -> Result<Address, AppError> {
        let contract = self.contract();
        let call = async { contract.monitoredWallet().call().await };
        match timeout(self.call_timeout, call).await {
            Ok(res) => {
                res.map_err(|e| AppError::Connection(format!("monitoredWallet() failed: {e}")))
            }
            Err(_) => Err(AppError::Connection(format!(
                "monitoredWallet() timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    async fn update_nonce(&self) -> Result<B256, AppError> {
        let from = self.signer.address();
        let bounded = self.call_timeout;

        let nonce = timeout(bounded, self.provider.get_transaction_count(from).pending())
            .await
            .map_err(|_| AppError::Initialization("updateNonce: nonce fetch timed out".into()))?
            .map_err(|e| AppError::Initialization(format!("updateNonce: nonce fetch failed: {e}")))?;
        let gas_price = timeout(bounded, self.provider.get_gas_price())
            .await
            .map_err(|_| AppError::Initialization("updateNonce: gas fetch timed out".into()))?
            .map_err(|e| AppError::Initialization(format!("updateNonce: gas fetch failed: {e}")))?;
        let chain_id = timeout(bounded, self.provider.get_chain_id())
            .await
            .map_err(|_| AppError::Initialization("updateNonce: chain id timed out".into()))?
            .map_err(|e| AppError::Initialization(format!("updateNonce: chain id failed: {e}")))?;

        let mut tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit: UPDATE_NONCE_GAS_LIMIT,
            to: TxKind::Call(self.address),
            value: U256::ZERO,
            input: WalletTrap::updateNonceCall {}.abi_encode().into(),
        };
        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
            .map_err(|e| AppError::Initialization(format!("Sign updateNonce failed: {e}")))?;
        let signed = tx.into_signed(sig);
        let envelope: TxEnvelope = signed.into();
        let raw = envelope.encoded_2718();

        let pending = timeout(bounded, self.provider.send_raw_transaction(&raw))
            .await
            .map_err(|_| AppError::Initialization("updateNonce: broadcast timed out".into()))?
            .map_err(|e| AppError::Initialization(format!("updateNonce: broadcast failed: {e}")))?;
        Ok(*pending.tx_hash())
    }
}
