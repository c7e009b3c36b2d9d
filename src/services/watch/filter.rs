// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::network::client::{ChainClient, ObservedTransaction};
use alloy::primitives::{Address, B256};
use std::sync::Arc;

/// Screens candidate hashes down to transactions sent by the monitored wallet.
pub struct CandidateFilter {
    client: Arc<dyn ChainClient>,
    monitored: Address,
}

impl CandidateFilter {
    pub fn new(client: Arc<dyn ChainClient>, monitored: Address) -> Self {
        Self { client, monitored }
    }

    /// Fetch the candidate and keep it only if the monitored wallet sent it.
    /// Fetch failures discard the candidate; the watch loop carries on.
    pub async fn screen(&self, hash: B256) -> Option<ObservedTransaction> {
        match self.client.transaction_by_hash(hash).await {
            Ok(Some(tx)) if tx.from == self.monitored => {
                tracing::info!(
                    target: "watch",
                    tx_hash = %hash,
                    "Detected outgoing tx from monitored wallet"
                );
                Some(tx)
            }
            Ok(Some(_)) => None,
            Ok(None) => {
                // Already dropped from the node's view; nothing to judge.
                tracing::debug!(target: "watch", tx_hash = %hash, "Candidate not found");
                None
            }
            Err(e) => {
                tracing::debug!(target: "watch", tx_hash = %hash, error = %e, "Candidate fetch failed");
                None
            }
        }
    }
}
