//! `AbiEventCoder`: the `EventCoder` implementation for one ABI event.
//!
//! # Usage
//! ```ignore
//! let coder = AbiEventCoder::from_abi_json(ERC20_ABI, "Transfer")?;
//! let topics = coder.encode(&args)?;           // [Some(topic0), Some(from), None, None, None]
//! let decoded = coder.decode(&log.data, &log.topics)?;
//! ```

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_dyn_abi::Specifier;
use alloy_json_abi::{Event, JsonAbi};
use chainconnex_core::{CodecError, DecodedArgs, EventCoder, IndexedArgs};
use serde_json::Value;

use crate::{fingerprint, normalizer};

/// Maximum number of topic slots a log can carry.
const MAX_TOPICS: usize = 5;

/// Codec for a single ABI event.
#[derive(Debug, Clone)]
pub struct AbiEventCoder {
    event: Event,
    /// Resolved type of every input, in declaration order.
    types: Vec<DynSolType>,
}

impl AbiEventCoder {
    pub fn new(event: Event) -> Result<Self, CodecError> {
        let types = event
            .inputs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                p.resolve().map_err(|e| CodecError::InvalidAbi {
                    reason: format!("param {i}: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let topic_count = usize::from(!event.anonymous) + event.inputs.iter().filter(|p| p.indexed).count();
        if topic_count > MAX_TOPICS {
            return Err(CodecError::InvalidAbi {
                reason: format!("event '{}' needs {topic_count} topics, at most {MAX_TOPICS} allowed", event.name),
            });
        }
        Ok(Self { event, types })
    }

    /// Build from a single ABI event object. A missing `"type"` is taken to be
    /// `"event"` and a missing `"anonymous"` to be `false`.
    pub fn from_event_json(json: &str) -> Result<Self, CodecError> {
        let mut item: Value = serde_json::from_str(json).map_err(|e| CodecError::InvalidAbi {
            reason: format!("invalid event JSON: {e}"),
        })?;
        if let Value::Object(obj) = &mut item {
            obj.entry("type").or_insert_with(|| Value::String("event".into()));
            obj.entry("anonymous").or_insert(Value::Bool(false));
        }
        let abi: JsonAbi = serde_json::from_value(Value::Array(vec![item])).map_err(|e| CodecError::InvalidAbi {
            reason: format!("invalid event JSON: {e}"),
        })?;
        let event = abi.events().next().cloned().ok_or_else(|| CodecError::InvalidAbi {
            reason: "JSON does not describe an event".into(),
        })?;
        Self::new(event)
    }

    /// Build from a full contract ABI, picking the event called `name`.
    pub fn from_abi_json(abi_json: &str, name: &str) -> Result<Self, CodecError> {
        let abi: JsonAbi = serde_json::from_str(abi_json).map_err(|e| CodecError::InvalidAbi {
            reason: format!("invalid ABI JSON: {e}"),
        })?;
        let event = abi.events().find(|e| e.name == name).cloned().ok_or_else(|| {
            CodecError::InvalidAbi {
                reason: format!("event '{name}' not found in ABI"),
            }
        })?;
        Self::new(event)
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> String {
        self.event.signature()
    }

    /// topic0 for this event, as `0x`-prefixed hex.
    pub fn selector(&self) -> String {
        fingerprint::keccak256_signature(&self.signature())
    }

    /// Look up an indexed argument by parameter name or declaration position.
    fn lookup<'a>(args: &'a IndexedArgs, position: usize, name: &str) -> Option<&'a Value> {
        let by_name = if name.is_empty() { None } else { args.get(name) };
        by_name
            .or_else(|| args.get(&position.to_string()))
            .filter(|v| !v.is_null())
    }

    fn encode_topic(&self, ty: &DynSolType, value: &Value) -> Result<String, String> {
        if let (DynSolType::String, Value::String(s)) = (ty, value) {
            return Ok(fingerprint::to_topic(&fingerprint::keccak256(s.as_bytes())));
        }
        let dyn_val = json_to_dyn_value(value, ty)?;
        match dyn_val {
            DynSolValue::Bytes(b) => Ok(fingerprint::to_topic(&fingerprint::keccak256(&b))),
            other => other
                .as_word()
                .map(|w| fingerprint::to_topic(w.as_slice()))
                .ok_or_else(|| format!("indexed {} is not supported", ty.sol_type_name())),
        }
    }

    fn decode_topic(&self, topic: &str, ty: &DynSolType) -> Result<Value, CodecError> {
        // Reference types are hashed in indexed position; the hash is all we can return.
        if is_hashed(ty) {
            return Ok(Value::String(topic.to_lowercase()));
        }
        let hex = topic.strip_prefix("0x").unwrap_or(topic);
        let bytes = hex::decode(hex).map_err(|e| CodecError::Decode {
            reason: format!("invalid topic hex: {e}"),
        })?;
        if bytes.len() != 32 {
            return Err(CodecError::Decode {
                reason: format!("topic must be 32 bytes, got {}", bytes.len()),
            });
        }
        ty.abi_decode(&bytes)
            .map(normalizer::normalize)
            .map_err(|e| CodecError::Decode {
                reason: format!("topic decode: {e}"),
            })
    }
}

impl EventCoder for AbiEventCoder {
    fn encode(&self, args: &IndexedArgs) -> Result<Vec<Option<String>>, CodecError> {
        for key in args.keys() {
            let known = self.event.inputs.iter().enumerate().any(|(i, p)| {
                p.indexed && (p.name == *key || i.to_string() == *key)
            });
            if !known {
                return Err(CodecError::Encode {
                    reason: format!("'{key}' is not an indexed parameter of {}", self.event.name),
                });
            }
        }

        let mut topics = Vec::with_capacity(MAX_TOPICS);
        if !self.event.anonymous {
            topics.push(Some(self.selector()));
        }
        for (i, (param, ty)) in self.event.inputs.iter().zip(&self.types).enumerate() {
            if !param.indexed {
                continue;
            }
            let slot = match Self::lookup(args, i, &param.name) {
                Some(value) => Some(self.encode_topic(ty, value).map_err(|reason| CodecError::Encode {
                    reason: format!("'{}': {reason}", label(i, &param.name)),
                })?),
                None => None,
            };
            topics.push(slot);
        }
        topics.resize(MAX_TOPICS, None);
        Ok(topics)
    }

    fn decode(&self, data: &str, topics: &[String]) -> Result<DecodedArgs, CodecError> {
        let skip = usize::from(!self.event.anonymous);
        let indexed_count = self.event.inputs.iter().filter(|p| p.indexed).count();
        if topics.len() < skip + indexed_count {
            return Err(CodecError::Decode {
                reason: format!("expected {} topics, got {}", skip + indexed_count, topics.len()),
            });
        }

        let data_types: Vec<DynSolType> = self
            .event
            .inputs
            .iter()
            .zip(&self.types)
            .filter(|(p, _)| !p.indexed)
            .map(|(_, t)| t.clone())
            .collect();
        let raw = hex::decode(data.strip_prefix("0x").unwrap_or(data)).map_err(|e| CodecError::Decode {
            reason: format!("invalid data hex: {e}"),
        })?;
        let mut data_values = if data_types.is_empty() {
            Vec::new()
        } else {
            match DynSolType::Tuple(data_types).abi_decode_sequence(&raw) {
                Ok(DynSolValue::Tuple(vals)) => vals,
                Ok(other) => vec![other],
                Err(e) => {
                    return Err(CodecError::Decode {
                        reason: e.to_string(),
                    })
                }
            }
        }
        .into_iter();

        let mut topic_iter = topics.iter().skip(skip);
        let mut out = DecodedArgs::new();
        for (i, (param, ty)) in self.event.inputs.iter().zip(&self.types).enumerate() {
            let value = if param.indexed {
                match topic_iter.next() {
                    Some(topic) => self.decode_topic(topic, ty)?,
                    None => Value::Null,
                }
            } else {
                data_values.next().map(normalizer::normalize).unwrap_or(Value::Null)
            };
            if !param.name.is_empty() {
                out.insert(param.name.clone(), value.clone());
            }
            out.insert(i.to_string(), value);
        }
        Ok(out)
    }
}

fn label(position: usize, name: &str) -> String {
    if name.is_empty() {
        format!("#{position}")
    } else {
        name.to_string()
    }
}

/// Types stored as keccak256 hashes when indexed.
fn is_hashed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

/// Convert a caller-supplied JSON value into the alloy `DynSolValue` for `expected`.
///
/// Strings are coerced with alloy's parser, so integers may be given in
/// decimal or `0x` hex and addresses in any letter case.
pub fn json_to_dyn_value(val: &Value, expected: &DynSolType) -> Result<DynSolValue, String> {
    let text = match val {
        Value::String(s) if matches!(expected, DynSolType::Address) => s.to_lowercase(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => val.to_string(),
        Value::Null | Value::Object(_) => {
            return Err(format!("cannot convert {val} to {}", expected.sol_type_name()));
        }
    };
    expected.coerce_str(&text).map_err(|e| e.to_string())
}
