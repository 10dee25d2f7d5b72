//! In-memory driver.
//!
//! Keeps a whole chain (blocks, accounts, logs, owned addresses) in RAM and
//! answers queries with the same criteria / range / order / paging semantics
//! a node would. Useful for tests, demos and offline tooling. All data is
//! lost when the driver is dropped.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tiny_keccak::{Hasher, Keccak};

use crate::chain::{Account, AccountCode, Block, ChainHead, Receipt, Revision, StorageValue, Transaction, VmOutput};
use crate::clause::Clause;
use crate::driver::{Driver, SigningHandle};
use crate::error::DriverError;
use crate::log::{EventCriteria, EventLog, FilterQuery, LogMeta, Order, TransferCriteria, TransferLog};
use crate::signing::{CertAnnex, CertMessage, CertOptions, CertResponse, ExplainOptions, TxOptions, TxResponse};

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// How the simulated wallet answers signing requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningPolicy {
    /// Sign everything as `signer` (unless the request pins another signer).
    Approve { signer: String },
    /// Refuse at submission time.
    Reject(String),
    /// Accept the submission, then refuse when the user is asked to confirm.
    RejectOnConfirm(String),
}

#[derive(Default)]
struct MemoryState {
    blocks: Vec<Block>,
    accounts: HashMap<String, Account>,
    code: HashMap<String, String>,
    storage: HashMap<(String, String), String>,
    transactions: HashMap<String, (Transaction, Receipt)>,
    event_logs: Vec<EventLog>,
    transfer_logs: Vec<TransferLog>,
    owned: Vec<String>,
    signing: Option<SigningPolicy>,
    signed: Vec<(Vec<Clause>, TxOptions)>,
    head_failures: u32,
    owned_failures: u32,
    requests: u64,
    nonce: u64,
}

/// A complete chain + wallet held in memory.
pub struct MemoryDriver {
    genesis: Block,
    state: Mutex<MemoryState>,
}

impl MemoryDriver {
    /// Create a chain containing only a genesis block stamped `genesis_timestamp`.
    pub fn new(genesis_timestamp: u64) -> Self {
        let genesis = Block {
            id: keccak_hex(format!("genesis:{genesis_timestamp}").as_bytes()),
            number: 0,
            size: 170,
            parent_id: format!("0x{}", "ff".repeat(32)),
            timestamp: genesis_timestamp,
            gas_limit: 10_000_000,
            beneficiary: ZERO_ADDRESS.into(),
            gas_used: 0,
            total_score: 0,
            signer: ZERO_ADDRESS.into(),
            txs_features: None,
            transactions: vec![],
            is_trunk: true,
        };
        let state = MemoryState {
            blocks: vec![genesis.clone()],
            signing: Some(SigningPolicy::Reject("no wallet configured".into())),
            ..Default::default()
        };
        Self {
            genesis,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a new block on top of the current head.
    pub fn mine(&self, timestamp: u64) -> Block {
        let mut st = self.state();
        let parent = st.blocks.last().cloned().unwrap_or_else(|| self.genesis.clone());
        let number = parent.number + 1;
        let block = Block {
            id: keccak_hex(format!("{}:{number}", parent.id).as_bytes()),
            number,
            parent_id: parent.id.clone(),
            timestamp,
            total_score: parent.total_score + 1,
            transactions: vec![],
            ..parent
        };
        st.blocks.push(block.clone());
        block
    }

    /// The latest block.
    pub fn head(&self) -> Block {
        self.state()
            .blocks
            .last()
            .cloned()
            .unwrap_or_else(|| self.genesis.clone())
    }

    /// Record an event log in the current head block.
    pub fn push_event_log(
        &self,
        address: &str,
        topics: Vec<String>,
        data: &str,
        tx_origin: &str,
    ) -> EventLog {
        let meta = self.next_meta(tx_origin);
        let log = EventLog {
            address: address.to_lowercase(),
            topics,
            data: data.to_string(),
            meta,
        };
        self.state().event_logs.push(log.clone());
        log
    }

    /// Record a transfer log in the current head block.
    pub fn push_transfer_log(
        &self,
        sender: &str,
        recipient: &str,
        amount: &str,
        tx_origin: &str,
    ) -> TransferLog {
        let meta = self.next_meta(tx_origin);
        let log = TransferLog {
            sender: sender.to_lowercase(),
            recipient: recipient.to_lowercase(),
            amount: amount.to_string(),
            meta,
        };
        self.state().transfer_logs.push(log.clone());
        log
    }

    fn next_meta(&self, tx_origin: &str) -> LogMeta {
        let head = self.head();
        let mut st = self.state();
        st.nonce += 1;
        LogMeta {
            block_id: head.id,
            block_number: head.number,
            block_timestamp: head.timestamp,
            tx_id: keccak_hex(format!("tx:{}", st.nonce).as_bytes()),
            tx_origin: tx_origin.to_lowercase(),
        }
    }

    pub fn set_account(&self, addr: &str, account: Account) {
        self.state().accounts.insert(addr.to_lowercase(), account);
    }

    pub fn set_code(&self, addr: &str, code: &str) {
        self.state().code.insert(addr.to_lowercase(), code.to_string());
    }

    pub fn set_storage(&self, addr: &str, key: &str, value: &str) {
        self.state()
            .storage
            .insert((addr.to_lowercase(), key.to_lowercase()), value.to_string());
    }

    pub fn insert_transaction(&self, tx: Transaction, receipt: Receipt) {
        self.state()
            .transactions
            .insert(tx.id.to_lowercase(), (tx, receipt));
    }

    /// Replace the set of addresses the simulated wallet controls.
    pub fn set_owned(&self, addrs: Vec<String>) {
        self.state().owned = addrs;
    }

    pub fn set_signing_policy(&self, policy: SigningPolicy) {
        self.state().signing = Some(policy);
    }

    /// Make the next `n` head polls fail with a transport error.
    pub fn fail_head_polls(&self, n: u32) {
        self.state().head_failures = n;
    }

    /// Make the next `n` owned-address polls fail with a transport error.
    pub fn fail_owned_polls(&self, n: u32) {
        self.state().owned_failures = n;
    }

    /// Number of calls received other than the two background polls.
    pub fn request_count(&self) -> u64 {
        self.state().requests
    }

    /// Every transaction request handed to the wallet, in order.
    pub fn signed_requests(&self) -> Vec<(Vec<Clause>, TxOptions)> {
        self.state().signed.clone()
    }

    fn record_request(&self) {
        self.state().requests += 1;
    }
}

/// Apply criteria, range, order and paging to an ascending log list.
fn select<C, L: Clone>(
    logs: &[L],
    query: &FilterQuery<C>,
    matches: impl Fn(&C, &L) -> bool,
    meta: impl Fn(&L) -> &LogMeta,
) -> Vec<L> {
    let hits = logs.iter().filter(|l| {
        (query.criteria_set.is_empty() || query.criteria_set.iter().any(|c| matches(c, l)))
            && query.range.map_or(true, |r| r.contains(meta(l)))
    });
    let ordered: Vec<&L> = match query.order {
        Order::Asc => hits.collect(),
        Order::Desc => hits.rev().collect(),
    };
    ordered
        .into_iter()
        .skip(query.options.offset as usize)
        .take(query.options.limit as usize)
        .cloned()
        .collect()
}

fn keccak_hex(input: &[u8]) -> String {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    format!("0x{}", hex::encode(output))
}

struct MemorySigningHandle {
    outcome: Result<TxResponse, DriverError>,
}

#[async_trait]
impl SigningHandle for MemorySigningHandle {
    async fn do_sign(self: Box<Self>) -> Result<TxResponse, DriverError> {
        self.outcome
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn genesis(&self) -> &Block {
        &self.genesis
    }

    async fn poll_head(&self) -> Result<ChainHead, DriverError> {
        {
            let mut st = self.state();
            if st.head_failures > 0 {
                st.head_failures -= 1;
                return Err(DriverError::Transport("injected head poll failure".into()));
            }
        }
        Ok(self.head().head())
    }

    async fn get_block(&self, revision: &Revision) -> Result<Option<Block>, DriverError> {
        self.record_request();
        let st = self.state();
        Ok(match revision {
            Revision::Id(id) => st.blocks.iter().find(|b| b.id.eq_ignore_ascii_case(id)).cloned(),
            Revision::Number(n) => st.blocks.get(*n as usize).cloned(),
        })
    }

    async fn get_transaction(&self, id: &str, _head: &str) -> Result<Option<Transaction>, DriverError> {
        self.record_request();
        Ok(self.state().transactions.get(&id.to_lowercase()).map(|(tx, _)| tx.clone()))
    }

    async fn get_receipt(&self, id: &str, _head: &str) -> Result<Option<Receipt>, DriverError> {
        self.record_request();
        Ok(self.state().transactions.get(&id.to_lowercase()).map(|(_, r)| r.clone()))
    }

    async fn get_account(&self, addr: &str, _revision: &str) -> Result<Account, DriverError> {
        self.record_request();
        Ok(self.state().accounts.get(&addr.to_lowercase()).cloned().unwrap_or_else(|| Account {
            balance: "0x0".into(),
            energy: "0x0".into(),
            has_code: false,
        }))
    }

    async fn get_code(&self, addr: &str, _revision: &str) -> Result<AccountCode, DriverError> {
        self.record_request();
        let code = self.state().code.get(&addr.to_lowercase()).cloned().unwrap_or_else(|| "0x".into());
        Ok(AccountCode { code })
    }

    async fn get_storage(&self, addr: &str, key: &str, _revision: &str) -> Result<StorageValue, DriverError> {
        self.record_request();
        let value = self
            .state()
            .storage
            .get(&(addr.to_lowercase(), key.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| format!("0x{}", "00".repeat(32)));
        Ok(StorageValue { value })
    }

    async fn explain(
        &self,
        clauses: Vec<Clause>,
        _options: ExplainOptions,
        _revision: &str,
    ) -> Result<Vec<VmOutput>, DriverError> {
        self.record_request();
        Ok(clauses
            .iter()
            .map(|c| VmOutput {
                data: "0x".into(),
                gas_used: if c.data == "0x" { 0 } else { 21_000 },
                ..Default::default()
            })
            .collect())
    }

    async fn filter_event_logs(&self, query: FilterQuery<EventCriteria>) -> Result<Vec<EventLog>, DriverError> {
        self.record_request();
        let st = self.state();
        Ok(select(&st.event_logs, &query, |c, l| c.matches(l), |l| &l.meta))
    }

    async fn filter_transfer_logs(
        &self,
        query: FilterQuery<TransferCriteria>,
    ) -> Result<Vec<TransferLog>, DriverError> {
        self.record_request();
        let st = self.state();
        Ok(select(&st.transfer_logs, &query, |c, l| c.matches(l), |l| &l.meta))
    }

    async fn sign_tx(
        &self,
        clauses: Vec<Clause>,
        options: TxOptions,
    ) -> Result<Box<dyn SigningHandle>, DriverError> {
        self.record_request();
        let mut st = self.state();
        st.nonce += 1;
        let nonce = st.nonce;
        st.signed.push((clauses.clone(), options.clone()));

        let policy = st.signing.clone();
        let outcome = match policy {
            Some(SigningPolicy::Approve { signer }) => {
                let payload = serde_json::to_vec(&clauses).unwrap_or_default();
                let mut seed = nonce.to_be_bytes().to_vec();
                seed.extend_from_slice(&payload);
                Ok(TxResponse {
                    txid: keccak_hex(&seed),
                    signer: options.signer.unwrap_or(signer),
                })
            }
            Some(SigningPolicy::RejectOnConfirm(reason)) => Err(DriverError::Declined(reason)),
            Some(SigningPolicy::Reject(reason)) => return Err(DriverError::Declined(reason)),
            None => return Err(DriverError::Other("no wallet configured".into())),
        };
        Ok(Box::new(MemorySigningHandle { outcome }))
    }

    async fn sign_cert(&self, message: CertMessage, options: CertOptions) -> Result<CertResponse, DriverError> {
        self.record_request();
        let policy = self.state().signing.clone();
        match policy {
            Some(SigningPolicy::Approve { signer }) => {
                let payload = serde_json::to_vec(&message).unwrap_or_default();
                Ok(CertResponse {
                    annex: CertAnnex {
                        domain: "localhost".into(),
                        timestamp: self.head().timestamp,
                        signer: options.signer.unwrap_or(signer),
                    },
                    signature: keccak_hex(&payload),
                })
            }
            Some(SigningPolicy::Reject(reason)) | Some(SigningPolicy::RejectOnConfirm(reason)) => {
                Err(DriverError::Declined(reason))
            }
            None => Err(DriverError::Other("no wallet configured".into())),
        }
    }

    async fn poll_owned_addresses(&self) -> Result<Vec<String>, DriverError> {
        let mut st = self.state();
        if st.owned_failures > 0 {
            st.owned_failures -= 1;
            return Err(DriverError::Transport("injected owned-address poll failure".into()));
        }
        Ok(st.owned.clone())
    }
}
