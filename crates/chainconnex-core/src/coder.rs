//! The ABI event codec capability.
//!
//! The façade never implements ABI encoding itself; an [`EventCoder`] bound
//! to one event definition is supplied by the caller (see `chainconnex-evm`
//! for the alloy-based implementation).

use serde_json::{Map, Value};

use crate::error::CodecError;

/// Indexed event arguments keyed by parameter name. Missing or `null`
/// entries leave the corresponding topic unconstrained.
pub type IndexedArgs = Map<String, Value>;

/// Decoded event arguments, keyed by parameter name and by position.
pub type DecodedArgs = Map<String, Value>;

pub trait EventCoder: Send + Sync {
    /// Encode indexed arguments into topic slots `topic0..topic4`.
    /// `None` marks a slot the filter should not constrain.
    fn encode(&self, indexed: &IndexedArgs) -> Result<Vec<Option<String>>, CodecError>;

    /// Decode a matched log's `data` and `topics` back into named arguments.
    fn decode(&self, data: &str, topics: &[String]) -> Result<DecodedArgs, CodecError>;
}
