// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::network::provider::{HttpProvider, WsProvider};
use alloy::consensus::Transaction as _;
use alloy::network::TransactionResponse;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Block tag for transaction-count lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonceTag {
    Latest,
    Pending,
}

/// Sender and payload of an observed pending transaction.
#[derive(Clone, Debug)]
pub struct ObservedTransaction {
    pub from: Address,
    pub input: Bytes,
}

/// Upstream node boundary. Watch logic only ever talks to this trait, so tests
/// can substitute a scripted chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Establish a pending-transaction notification stream. Establishment is a
    /// single attempt; the returned channel closing signals a runtime failure
    /// of the subscription.
    async fn subscribe_pending(&self) -> Result<mpsc::Receiver<B256>, AppError>;

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ObservedTransaction>, AppError>;

    async fn transaction_count(&self, address: Address, tag: NonceTag) -> Result<u64, AppError>;

    async fn balance(&self, address: Address) -> Result<U256, AppError>;

    async fn gas_price(&self) -> Result<u128, AppError>;

    async fn chain_id(&self) -> Result<u64, AppError>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, AppError>;
}

/// Production client over a streaming and a unary provider handle. Every call
/// carries a bounded deadline so a hung upstream cannot stall the watch loop.
pub struct RpcChainClient {
    stream: WsProvider,
    http: HttpProvider,
    call_timeout: Duration,
}

const SUBSCRIPTION_BUFFER: usize = 1_024;
const LOOKUP_ATTEMPTS: usize = 3;
const LOOKUP_BACKOFF: Duration = Duration::from_millis(100);

impl RpcChainClient {
    pub fn new(stream: WsProvider, http: HttpProvider, call_timeout: Duration) -> Self {
        Self {
            stream,
            http,
            call_timeout,
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn subscribe_pending(&self) -> Result<mpsc::Receiver<B256>, AppError> {
        let sub = timeout(
            self.call_timeout,
            self.stream.subscribe_pending_transactions(),
        )
        .await
        .map_err(|_| {
            AppError::Subscription(format!(
                "subscribe timed out after {:?}",
                self.call_timeout
            ))
        })?
        .map_err(|e| AppError::Subscription(format!("pending tx subscription failed: {e}")))?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        tokio::spawn(async move {
            let mut stream = sub.into_stream();
            while let Some(hash) = stream.next().await {
                if tx.send(hash).await.is_err() {
                    // Receiver dropped; the watcher has moved on.
                    return;
                }
            }
            // Sender drop closes the channel; the drain loop observes it as a
            // runtime subscription failure.
            tracing::warn!(target: "rpc", "Pending tx subscription stream ended");
        });
        Ok(rx)
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ObservedTransaction>, AppError> {
        match timeout(self.call_timeout, self.http.get_transaction_by_hash(hash)).await {
            Ok(Ok(Some(tx))) => Ok(Some(ObservedTransaction {
                from: tx.from(),
                input: tx.input().clone(),
            })),
            Ok(Ok(None)) => Ok(None),
            Ok(Err(e)) => Err(AppError::Connection(format!("Tx fetch failed: {e}"))),
            Err(_) => Err(AppError::Connection(format!(
                "Tx fetch timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    async fn transaction_count(&self, address: Address, tag: NonceTag) -> Result<u64, AppError> {
        let provider = self.http.clone();
        let limit = self.call_timeout;
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move {
                    let fetch = async {
                        match tag {
                            NonceTag::Pending => {
                                provider.get_transaction_count(address).pending().await
                            }
                            NonceTag::Latest => {
                                provider.get_transaction_count(address).latest().await
                            }
                        }
                    };
                    match timeout(limit, fetch).await {
                        Ok(res) => res.map_err(|e| e.to_string()),
                        Err(_) => Err(format!("timed out after {limit:?}")),
                    }
                }
            },
            LOOKUP_ATTEMPTS,
            LOOKUP_BACKOFF,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Failed to fetch nonce: {e}")))
    }

    async fn balance(&self, address: Address) -> Result<U256, AppError> {
        let provider = self.http.clone();
        let limit = self.call_timeout;
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move {
                    match timeout(limit, provider.get_balance(address)).await {
                        Ok(res) => res.map_err(|e| e.to_string()),
                        Err(_) => Err(format!("timed out after {limit:?}")),
                    }
                }
            },
            LOOKUP_ATTEMPTS,
            LOOKUP_BACKOFF,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Failed to fetch balance: {e}")))
    }

    async fn gas_price(&self) -> Result<u128, AppError> {
        let provider = self.http.clone();
        let limit = self.call_timeout;
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move {
                    match timeout(limit, provider.get_gas_price()).await {
                        Ok(res) => res.map_err(|e| e.to_string()),
                        Err(_) => Err(format!("timed out after {limit:?}")),
                    }
                }
            },
            LOOKUP_ATTEMPTS,
            LOOKUP_BACKOFF,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Failed to fetch gas price: {e}")))
    }

    async fn chain_id(&self) -> Result<u64, AppError> {
        match timeout(self.call_timeout, self.http.get_chain_id()).await {
            Ok(res) => {
                res.map_err(|e| AppError::Connection(format!("Chain id fetch failed: {e}")))
            }
            Err(_) => Err(AppError::Connection(format!(
                "Chain id fetch timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, AppError> {
        match timeout(self.call_timeout, self.http.send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(AppError::Transaction {
                hash: "<unsubmitted>".into(),
                reason: format!("broadcast rejected: {e}"),
            }),
            Err(_) => Err(AppError::Transaction {
                hash: "<unsubmitted>".into(),
                reason: format!("broadcast timed out after {:?}", self.call_timeout),
            }),
        }
    }
}
