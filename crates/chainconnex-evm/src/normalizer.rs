//! Converts alloy-core `DynSolValue` → JSON values handed back to callers.
//!
//! Integers are rendered as decimal strings so 256-bit values survive
//! JSON round-trips. Addresses and byte strings are lowercase `0x` hex.

use alloy_core::dyn_abi::DynSolValue;
use serde_json::Value;

/// Convert a decoded `DynSolValue` into JSON.
pub fn normalize(val: DynSolValue) -> Value {
    match val {
        DynSolValue::Bool(b) => Value::Bool(b),

        DynSolValue::Int(i, _bits) => Value::String(i.to_string()),

        DynSolValue::Uint(u, _bits) => Value::String(u.to_string()),

        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", hex::encode(&word[..size])))
        }

        DynSolValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),

        DynSolValue::String(s) => Value::String(s),

        DynSolValue::Address(a) => Value::String(format!("{a:#x}")),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) | DynSolValue::Tuple(vals) => {
            Value::Array(vals.into_iter().map(normalize).collect())
        }

        DynSolValue::Function(f) => Value::String(format!("0x{}", hex::encode(f.as_slice()))),
    }
}
