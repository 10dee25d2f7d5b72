//! chainconnex-core: foundation for the ChainConnex query and signing façade.
//!
//! # Architecture
//!
//! ```text
//! caller → validator (reject early) → builder (thor / vendor crates)
//!                                        │
//!                                        ▼
//!                               Driver (chain I/O, wallet)
//!                                        │
//!                                        ▼
//!                       reshaping (EventCoder decode, Rejected mapping)
//! ```
//!
//! This crate defines:
//!
//! - [`validator`]: format predicates and [`validator::ensure`]
//! - [`Driver`] / [`SigningHandle`]: the collaborator every façade call goes through
//! - [`EventCoder`]: the ABI event codec capability
//! - [`ConnexError`]: `BadParameter` vs `Rejected`, plus pass-through driver/decode errors
//! - [`clause`]: normalisation of loosely typed transaction clauses
//! - [`memory::MemoryDriver`]: an in-memory chain used by tests and the CLI

pub mod chain;
pub mod clause;
pub mod coder;
pub mod config;
pub mod driver;
pub mod error;
pub mod log;
pub mod memory;
pub mod signing;
pub mod validator;

pub use chain::{
    Account, AccountCode, Block, ChainHead, Receipt, Revision, StorageValue, Transaction, VmOutput,
};
pub use clause::{Clause, ClauseInput, ClauseValue};
pub use coder::{DecodedArgs, EventCoder, IndexedArgs};
pub use config::{HeadTrackerConfig, PollerConfig};
pub use driver::{Driver, SigningHandle};
pub use error::{CodecError, ConnexError, DriverError, Pending};
pub use log::{
    EventCriteria, EventLog, FilterKind, FilterQuery, FilterRange, LogMeta, Order, PageOptions,
    RangeUnit, TransferCriteria, TransferLog,
};
pub use memory::{MemoryDriver, SigningPolicy};
pub use signing::{
    CertAnnex, CertMessage, CertOptions, CertPayload, CertPurpose, CertResponse, ExplainOptions,
    PayloadType, TxOptions, TxResponse,
};
