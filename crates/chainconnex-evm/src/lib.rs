//! # chainconnex-evm
//!
//! ABI event codec implementing the `EventCoder` trait from `chainconnex-core`.
//!
//! ## Implementation notes
//! - Uses `alloy-core` for ABI encode / decode
//! - topic0 → event selector (keccak256 of the signature), omitted for anonymous events
//! - topic1.. → indexed parameters (value types as 32-byte words, reference types hashed)
//! - `data` → non-indexed parameters (ABI-encoded sequence)

pub mod coder;
pub mod fingerprint;
pub mod normalizer;

pub use coder::AbiEventCoder;
