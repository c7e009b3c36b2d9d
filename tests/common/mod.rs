// SPDX-License-Identifier: MIT
// Shared scripted doubles for the watcher integration tests. `MockChain`
// plays the upstream node, `MockTrap` plays the protective contract; both
// record every interaction so tests can assert exact call counts.
#![allow(dead_code)]

use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use trapwatch::domain::error::AppError;
use trapwatch::network::client::{ChainClient, NonceTag, ObservedTransaction};
use trapwatch::network::trap::TrapOracle;
use trapwatch::services::watch::evaluator::TrapEvaluator;
use trapwatch::services::watch::filter::CandidateFilter;
use trapwatch::services::watch::sweep::{SweepBuilder, SweepConfig};
use trapwatch::services::watch::watcher::{WatchTimings, Watcher};

pub fn monitored_addr() -> Address {
    Address::from([0x11; 20])
}

pub fn vault_addr() -> Address {
    Address::from([0x22; 20])
}

pub fn other_addr() -> Address {
    Address::from([0x33; 20])
}

pub const ONE_ETH_WEI: u128 = 1_000_000_000_000_000_000;
pub const MARGIN_WEI: u128 = 1_000_000_000_000_000;

#[derive(Default)]
pub struct MockChain {
    /// Scripted pending-count responses, consumed per call; the final entry
    /// repeats once the script runs dry.
    pub pending_counts: Mutex<VecDeque<Result<u64, String>>>,
    subscription: Mutex<Option<Result<mpsc::Receiver<B256>, String>>>,
    pub subscribe_calls: AtomicUsize,
    transactions: Mutex<HashMap<B256, ObservedTransaction>>,
    failing_hashes: Mutex<HashSet<B256>>,
    pub balance: Mutex<U256>,
    pub gas_price: Mutex<u128>,
    pub chain_id: Mutex<u64>,
    /// Raw payloads handed to `send_raw_transaction`.
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub fail_send: Mutex<bool>,
}

impl MockChain {
    pub fn new() -> Self {
        let chain = Self::default();
        *chain.balance.lock().unwrap() = U256::from(ONE_ETH_WEI);
        *chain.gas_price.lock().unwrap() = 50_000_000_000; // 50 gwei
        *chain.chain_id.lock().unwrap() = 17_000;
        chain
    }

    pub fn script_counts(&self, seq: &[u64]) {
        let mut guard = self.pending_counts.lock().unwrap();
        guard.clear();
        guard.extend(seq.iter().copied().map(Ok));
    }

    pub fn script_count_results(&self, seq: Vec<Result<u64, String>>) {
        let mut guard = self.pending_counts.lock().unwrap();
        guard.clear();
        guard.extend(seq);
    }

    /// Arm a working subscription; returns the feeding side.
    pub fn with_subscription(&self) -> mpsc::Sender<B256> {
        let (tx, rx) = mpsc::channel(16);
        *self.subscription.lock().unwrap() = Some(Ok(rx));
        tx
    }

    pub fn fail_subscription(&self, reason: &str) {
        *self.subscription.lock().unwrap() = Some(Err(reason.to_string()));
    }

    pub fn insert_transaction(&self, hash: B256, from: Address, input: Bytes) {
        self.transactions
            .lock()
            .unwrap()
            .insert(hash, ObservedTransaction { from, input });
    }

    pub fn fail_transaction_fetch(&self, hash: B256) {
        self.failing_hashes.lock().unwrap().insert(hash);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn subscribe_pending(&self) -> Result<mpsc::Receiver<B256>, AppError> {
        self.subscribe_calls.fetch_add(1, Ordering::Relaxed);
        match self.subscription.lock().unwrap().take() {
            Some(Ok(rx)) => Ok(rx),
            Some(Err(reason)) => Err(AppError::Subscription(reason)),
            None => Err(AppError::Subscription("no subscription scripted".into())),
        }
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ObservedTransaction>, AppError> {
        if self.failing_hashes.lock().unwrap().contains(&hash) {
            return Err(AppError::Connection("tx fetch failed".into()));
        }
        Ok(self.transactions.lock().unwrap().get(&hash).cloned())
    }

    async fn transaction_count(&self, _address: Address, _tag: NonceTag) -> Result<u64, AppError> {
        let mut guard = self.pending_counts.lock().unwrap();
        let next = if guard.len() > 1 {
            guard.pop_front()
        } else {
            guard.front().cloned()
        };
        match next {
            Some(Ok(n)) => Ok(n),
            Some(Err(e)) => Err(AppError::Connection(e)),
            None => Err(AppError::Connection("no scripted count".into())),
        }
    }

    async fn balance(&self, _address: Address) -> Result<U256, AppError> {
        Ok(*self.balance.lock().unwrap())
    }

    async fn gas_price(&self) -> Result<u128, AppError> {
        Ok(*self.gas_price.lock().unwrap())
    }

    async fn chain_id(&self) -> Result<u64, AppError> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, AppError> {
        if *self.fail_send.lock().unwrap() {
            return Err(AppError::Transaction {
                hash: "<unsubmitted>".into(),
                reason: "broadcast rejected".into(),
            });
        }
        self.sent.lock().unwrap().push(raw.to_vec());
        Ok(B256::from([0xab; 32]))
    }
}

pub struct MockTrap {
    pub should_respond: Mutex<bool>,
    pub payload: Mutex<Bytes>,
    pub collect_calls: AtomicUsize,
    pub fail_collect: Mutex<bool>,
    /// Scripted `safeVault()` responses; the final entry repeats.
    pub vaults: Mutex<VecDeque<Result<Address, String>>>,
}

impl MockTrap {
    pub fn responding(payload: Bytes) -> Self {
        let trap = Self::silent();
        *trap.should_respond.lock().unwrap() = true;
        *trap.payload.lock().unwrap() = payload;
        trap
    }

    /// A trap whose verdict is always "no response warranted".
    pub fn silent() -> Self {
        Self {
            should_respond: Mutex::new(false),
            payload: Mutex::new(Bytes::new()),
            collect_calls: AtomicUsize::new(0),
            fail_collect: Mutex::new(false),
            vaults: Mutex::new(VecDeque::from([Ok(vault_addr())])),
        }
    }

    pub fn script_vaults(&self, seq: Vec<Result<Address, String>>) {
        let mut guard = self.vaults.lock().unwrap();
        guard.clear();
        guard.extend(seq);
    }

    pub fn evaluations(&self) -> usize {
        self.collect_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TrapOracle for MockTrap {
    async fn collect(&self) -> Result<Bytes, AppError> {
        self.collect_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_collect.lock().unwrap() {
            return Err(AppError::Evaluation("collect() reverted".into()));
        }
        Ok(Bytes::from_static(&[0x01]))
    }

    async fn analyze(&self, _observation: Bytes) -> Result<(bool, Bytes), AppError> {
        Ok((
            *self.should_respond.lock().unwrap(),
            self.payload.lock().unwrap().clone(),
        ))
    }

    async fn safe_vault(&self) -> Result<Address, AppError> {
        let mut guard = self.vaults.lock().unwrap();
        let next = if guard.len() > 1 {
            guard.pop_front()
        } else {
            guard.front().cloned()
        };
        match next {
            Some(Ok(addr)) => Ok(addr),
            Some(Err(e)) => Err(AppError::Connection(e)),
            None => Err(AppError::Connection("no scripted vault".into())),
        }
    }

    async fn monitored_wallet(&self) -> Result<Address, AppError> {
        Ok(monitored_addr())
    }

    async fn update_nonce(&self) -> Result<B256, AppError> {
        Ok(B256::ZERO)
    }
}

pub fn sweep_config() -> SweepConfig {
    SweepConfig {
        margin_wei: U256::from(MARGIN_WEI),
        gas_limit: 21_000,
        gas_price_multiplier: 2,
    }
}

pub fn build_watcher(
    chain: Arc<MockChain>,
    trap: Arc<MockTrap>,
    shutdown: CancellationToken,
) -> Watcher {
    let client: Arc<dyn ChainClient> = chain;
    let trap: Arc<dyn TrapOracle> = trap;
    let signer = alloy::signers::local::PrivateKeySigner::random();
    let filter = CandidateFilter::new(client.clone(), monitored_addr());
    let evaluator = TrapEvaluator::new(trap.clone());
    let sweep = SweepBuilder::new(
        client.clone(),
        trap,
        signer,
        monitored_addr(),
        sweep_config(),
        false,
    );
    Watcher::new(
        client,
        filter,
        evaluator,
        sweep,
        monitored_addr(),
        WatchTimings {
            poll_interval: Duration::from_secs(5),
            idle_delay: Duration::from_millis(200),
        },
        shutdown,
    )
}
