// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::network::client::{ChainClient, NonceTag};
use crate::services::watch::evaluator::TrapEvaluator;
use crate::services::watch::filter::CandidateFilter;
use crate::services::watch::session::WatchSession;
use crate::services::watch::sweep::SweepBuilder;
use alloy::primitives::{Address, B256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug)]
pub struct WatchTimings {
    /// Interval between pending-nonce polls in fallback mode.
    pub poll_interval: Duration,
    /// Idle delay when the subscription channel has nothing to drain.
    pub idle_delay: Duration,
}

/// The dual-mode watch loop. Subscription mode drains pending-tx hashes
/// through the candidate filter; on any subscription failure it downgrades
/// once, permanently, to pending-nonce polling.
pub struct Watcher {
    client: Arc<dyn ChainClient>,
    filter: CandidateFilter,
    evaluator: TrapEvaluator,
    sweep: SweepBuilder,
    monitored: Address,
    session: WatchSession,
    timings: WatchTimings,
    shutdown: CancellationToken,
}

impl Watcher {
    pub fn new(
        client: Arc<dyn ChainClient>,
        filter: CandidateFilter,
        evaluator: TrapEvaluator,
        sweep: SweepBuilder,
        monitored: Address,
        timings: WatchTimings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            filter,
            evaluator,
            sweep,
            monitored,
            session: WatchSession::new(),
            timings,
            shutdown,
        }
    }

    pub fn session(&self) -> &WatchSession {
        &self.session
    }

    /// Run until cancelled. No steady-state error terminates the loop; the
    /// worst outcome of a failure is a forfeited trigger or the one-way
    /// downgrade to polling.
    pub async fn run(&mut self) -> Result<(), AppError> {
        tracing::info!(target: "watch", wallet = %self.monitored, "Watching for outgoing transactions");

        match self.client.subscribe_pending().await {
            Ok(rx) => {
                self.session.begin_subscription();
                match self.subscription_loop(rx).await {
                    Ok(()) => return Ok(()), // cancelled
                    Err(e) => self.session.downgrade(&e.to_string()),
                }
            }
            Err(e) => self.session.downgrade(&e.to_string()),
        }

        self.polling_loop().await
    }

    /// Drain newly available hashes without blocking; idle briefly when the
    /// channel is empty. `Ok(())` means cancellation; `Err` means the
    /// subscription died and the caller must downgrade.
    async fn subscription_loop(&mut self, mut rx: mpsc::Receiver<B256>) -> Result<(), AppError> {
        tracing::info!(target: "watch", "Subscribed to pending transactions");
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(());
            }
            match rx.try_recv() {
                Ok(hash) => {
                    if self.filter.screen(hash).await.is_some() {
                        self.handle_trigger(Some(hash)).await;
                    }
                }
                Err(TryRecvError::Empty) => {
                    tokio::select! {
                        _ = self.shutdown.cancelled() => return Ok(()),
                        _ = sleep(self.timings.idle_delay) => {}
                    }
                }
                Err(TryRecvError::Disconnected) => {
                    return Err(AppError::Subscription("pending tx stream ended".into()));
                }
            }
        }
    }

    /// Fallback: watch the pending transaction count. Any increase since the
    /// last observation proves an outgoing transaction, so the candidate
    /// filter is bypassed. A burst between polls collapses to one trigger.
    async fn polling_loop(&mut self) -> Result<(), AppError> {
        let mut primed = false;
        match self
            .client
            .transaction_count(self.monitored, NonceTag::Pending)
            .await
        {
            Ok(baseline) => {
                self.session.record_nonce(baseline);
                primed = true;
                tracing::info!(target: "watch", baseline, "Polling pending nonce");
            }
            Err(e) => {
                tracing::warn!(target: "watch", error = %e, "Baseline nonce fetch failed; will prime on first successful poll");
            }
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                _ = sleep(self.timings.poll_interval) => {}
            }

            match self
                .client
                .transaction_count(self.monitored, NonceTag::Pending)
                .await
            {
                Ok(current) => {
                    if !primed {
                        self.session.record_nonce(current);
                        primed = true;
                        continue;
                    }
                    if current > self.session.last_nonce_seen() {
                        tracing::info!(
                            target: "watch",
                            last = self.session.last_nonce_seen(),
                            current,
                            "Nonce increase detected - potential outgoing tx"
                        );
                        self.handle_trigger(None).await;
                        self.session.record_nonce(current);
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "watch", error = %e, "Pending nonce poll failed; skipping cycle");
                }
            }
        }
    }

    /// Each trigger gets one evaluation and at most one submission attempt.
    async fn handle_trigger(&self, tx_hash: Option<B256>) {
        match self.evaluator.evaluate().await {
            Ok(verdict) if verdict.should_respond => {
                tracing::warn!(
                    target: "trap",
                    ?tx_hash,
                    payload = %verdict.response_payload,
                    "Trap triggered; sweeping funds"
                );
                match self.sweep.submit(verdict.response_payload).await {
                    Ok(hash) => {
                        tracing::info!(target: "sweep", sweep_tx = %hash, "Sweep submitted");
                    }
                    Err(e) => {
                        tracing::error!(
                            target: "sweep",
                            error = %e,
                            "Sweep submission failed; trigger forfeited"
                        );
                    }
                }
            }
            Ok(_) => {
                tracing::info!(target: "trap", ?tx_hash, "No response warranted");
            }
            Err(e) => {
                tracing::warn!(target: "trap", ?tx_hash, error = %e, "Evaluation failed; treating as no trigger");
            }
        }
    }
}
