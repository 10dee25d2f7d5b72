//! The `Driver` trait: the single collaborator behind every façade call.
//!
//! A driver owns all I/O: polling the node, running log queries and VM
//! simulations, and talking to the wallet. The façade only ever hands it
//! validated, lowercased, fully-defaulted requests.

use async_trait::async_trait;

use crate::chain::{Account, AccountCode, Block, ChainHead, Receipt, Revision, StorageValue, Transaction, VmOutput};
use crate::clause::Clause;
use crate::error::DriverError;
use crate::log::{EventCriteria, EventLog, FilterQuery, TransferCriteria, TransferLog};
use crate::signing::{CertMessage, CertOptions, CertResponse, ExplainOptions, TxOptions, TxResponse};

/// Chain and wallet access used by the façade.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and is stored as `Arc<dyn Driver>`.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// The genesis block of the connected chain.
    fn genesis(&self) -> &Block;

    /// Fetch the current head. May long-poll; failures are treated as transient.
    async fn poll_head(&self) -> Result<ChainHead, DriverError>;

    async fn get_block(&self, revision: &Revision) -> Result<Option<Block>, DriverError>;

    /// Look up a transaction as seen from block `head`.
    async fn get_transaction(&self, id: &str, head: &str) -> Result<Option<Transaction>, DriverError>;

    async fn get_receipt(&self, id: &str, head: &str) -> Result<Option<Receipt>, DriverError>;

    async fn get_account(&self, addr: &str, revision: &str) -> Result<Account, DriverError>;

    async fn get_code(&self, addr: &str, revision: &str) -> Result<AccountCode, DriverError>;

    async fn get_storage(&self, addr: &str, key: &str, revision: &str) -> Result<StorageValue, DriverError>;

    /// Simulate clauses on top of block `revision`.
    async fn explain(
        &self,
        clauses: Vec<Clause>,
        options: ExplainOptions,
        revision: &str,
    ) -> Result<Vec<VmOutput>, DriverError>;

    async fn filter_event_logs(&self, query: FilterQuery<EventCriteria>) -> Result<Vec<EventLog>, DriverError>;

    async fn filter_transfer_logs(
        &self,
        query: FilterQuery<TransferCriteria>,
    ) -> Result<Vec<TransferLog>, DriverError>;

    /// Hand a transaction to the wallet. The returned handle completes the
    /// signature (user confirmation, broadcast) when driven.
    async fn sign_tx(
        &self,
        clauses: Vec<Clause>,
        options: TxOptions,
    ) -> Result<Box<dyn SigningHandle>, DriverError>;

    async fn sign_cert(&self, message: CertMessage, options: CertOptions) -> Result<CertResponse, DriverError>;

    /// Fetch the addresses the connected wallet controls. May long-poll.
    async fn poll_owned_addresses(&self) -> Result<Vec<String>, DriverError>;
}

/// Second stage of a transaction signing request.
#[async_trait]
pub trait SigningHandle: Send {
    async fn do_sign(self: Box<Self>) -> Result<TxResponse, DriverError>;
}
