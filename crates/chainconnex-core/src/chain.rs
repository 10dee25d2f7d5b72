//! Chain entity types: head, blocks, accounts, transactions, receipts.

use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::log::LogMeta;

// ─── ChainHead ───────────────────────────────────────────────────────────────

/// Snapshot of the most recently known tip block.
///
/// The head tracker replaces it wholesale on every observed change; it is
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHead {
    /// Block ID (`0x…`, 32 bytes).
    pub id: String,
    pub number: u32,
    /// Unix timestamp of the block (seconds since epoch).
    pub timestamp: u64,
    #[serde(rename = "parentID")]
    pub parent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txs_features: Option<u32>,
}

// ─── Revision ────────────────────────────────────────────────────────────────

/// Selects a block either by ID or by height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Revision {
    Id(String),
    /// Height; must fit in 32 bits to be accepted by the façade.
    Number(u64),
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<u32> for Revision {
    fn from(n: u32) -> Self {
        Self::Number(u64::from(n))
    }
}

// ─── Block ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub number: u32,
    pub size: u32,
    #[serde(rename = "parentID")]
    pub parent_id: String,
    pub timestamp: u64,
    pub gas_limit: u64,
    pub beneficiary: String,
    pub gas_used: u64,
    pub total_score: u64,
    pub signer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txs_features: Option<u32>,
    /// IDs of the transactions included in this block.
    pub transactions: Vec<String>,
    pub is_trunk: bool,
}

impl Block {
    /// The head summary for this block.
    pub fn head(&self) -> ChainHead {
        ChainHead {
            id: self.id.clone(),
            number: self.number,
            timestamp: self.timestamp,
            parent_id: self.parent_id.clone(),
            txs_features: self.txs_features,
        }
    }
}

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Balance in wei, hex-encoded.
    pub balance: String,
    /// Energy (gas token) balance, hex-encoded.
    pub energy: String,
    pub has_code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageValue {
    pub value: String,
}

// ─── Transaction / Receipt ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub chain_tag: u8,
    pub block_ref: String,
    pub expiration: u32,
    pub clauses: Vec<Clause>,
    pub gas_price_coef: u8,
    pub gas: u64,
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegator: Option<String>,
    pub nonce: String,
    #[serde(default)]
    pub depends_on: Option<String>,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LogMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub gas_used: u64,
    pub gas_payer: String,
    /// Fee paid, hex-encoded.
    pub paid: String,
    /// Reward to the block signer, hex-encoded.
    pub reward: String,
    pub reverted: bool,
    /// Per-clause outputs; shape is driver-defined.
    #[serde(default)]
    pub outputs: Vec<serde_json::Value>,
    pub meta: LogMeta,
}

// ─── VM simulation ───────────────────────────────────────────────────────────

/// Result of simulating one clause through the VM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmOutput {
    /// Return data, hex-encoded.
    pub data: String,
    pub vm_error: String,
    pub gas_used: u64,
    pub reverted: bool,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    #[serde(default)]
    pub transfers: Vec<serde_json::Value>,
}
