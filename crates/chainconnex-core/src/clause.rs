//! Transaction clauses and their normalisation.
//!
//! Callers hand in loosely shaped clauses (typed [`ClauseInput`] or raw JSON);
//! [`normalize_clauses`] / [`clauses_from_json`] fill defaults, validate every
//! field and tag failures with the clause index (`'#2.value' ...`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConnexError;
use crate::validator::{self, ensure};

/// Amount of a clause: a safe integer or an integer string (hex or decimal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClauseValue {
    Number(u64),
    Text(String),
}

impl Default for ClauseValue {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<u64> for ClauseValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A clause as supplied by the caller; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseInput {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<ClauseValue>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ClauseInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, addr: impl Into<String>) -> Self {
        self.to = Some(addr.into());
        self
    }

    pub fn value(mut self, value: impl Into<ClauseValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }
}

/// A validated clause with defaults applied. `to == None` deploys a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub to: Option<String>,
    pub value: ClauseValue,
    pub data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Validate a batch of typed clauses.
pub fn normalize_clauses(inputs: Vec<ClauseInput>) -> Result<Vec<Clause>, ConnexError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, c)| normalize_clause(i, c))
        .collect()
}

/// Validate a JSON clause batch; the top-level value must be an array.
pub fn clauses_from_json(value: &Value) -> Result<Vec<Clause>, ConnexError> {
    let items = value
        .as_array()
        .ok_or_else(|| ConnexError::bad_parameter("expected array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| clause_input_from_json(i, v).and_then(|c| normalize_clause(i, c)))
        .collect()
}

/// Fill defaults for clause `#index` and validate it.
pub fn normalize_clause(index: usize, input: ClauseInput) -> Result<Clause, ConnexError> {
    let to = input.to.filter(|s| !s.is_empty());
    if let Some(addr) = &to {
        ensure(
            validator::is_address(addr),
            format!("'#{index}.to' expected null or address type"),
        )?;
    }

    let value = match input.value {
        None => ClauseValue::Number(0),
        Some(ClauseValue::Text(s)) if s.is_empty() => ClauseValue::Number(0),
        Some(v) => v,
    };
    let value_ok = match &value {
        ClauseValue::Number(n) => validator::is_safe_uint(*n),
        ClauseValue::Text(s) => validator::is_hex_uint(s) || validator::is_decimal_uint(s),
    };
    ensure(
        value_ok,
        format!("'#{index}.value' expected non-negative safe integer or integer in hex|dec string"),
    )?;

    let data = input
        .data
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "0x".to_string());
    ensure(
        validator::is_hex_bytes(&data),
        format!("'#{index}.data' expected bytes in hex"),
    )?;

    Ok(Clause {
        to: to.map(|a| validator::canonical(&a)),
        value,
        data,
        comment: input.comment.unwrap_or_default(),
    })
}

/// Shape-check one JSON clause. Falsy fields (`null`, `false`, `""`, `0`)
/// fall back to their defaults, matching what wallets accept from web callers.
fn clause_input_from_json(index: usize, v: &Value) -> Result<ClauseInput, ConnexError> {
    let obj = v
        .as_object()
        .ok_or_else(|| ConnexError::bad_parameter(format!("'#{index}' expected object")))?;

    let to = match obj.get("to") {
        None => None,
        Some(v) if is_falsy(v) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ConnexError::bad_parameter(format!(
                "'#{index}.to' expected null or address type"
            )))
        }
    };

    let value = match obj.get("value") {
        None => None,
        Some(v) if is_falsy(v) => None,
        Some(Value::String(s)) => Some(ClauseValue::Text(s.clone())),
        Some(Value::Number(n)) => match json_integer(n) {
            Some(n) => Some(ClauseValue::Number(n)),
            None => {
                return Err(ConnexError::bad_parameter(format!(
                    "'#{index}.value' expected non-negative safe integer or integer in hex|dec string"
                )))
            }
        },
        Some(_) => {
            return Err(ConnexError::bad_parameter(format!(
                "'#{index}.value' expected non-negative safe integer or integer in hex|dec string"
            )))
        }
    };

    let data = match obj.get("data") {
        None => None,
        Some(v) if is_falsy(v) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ConnexError::bad_parameter(format!(
                "'#{index}.data' expected bytes in hex"
            )))
        }
    };

    let comment = match obj.get("comment") {
        None => None,
        Some(v) if is_falsy(v) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ConnexError::bad_parameter(format!(
                "'#{index}.comment' expected string"
            )))
        }
    };

    Ok(ClauseInput { to, value, data, comment })
}

/// `null`, `false` and numeric zero. Empty strings are defaulted later by
/// [`normalize_clause`].
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// A JSON number holding a non-negative integer, including float spellings
/// such as `1.0` or `1e3`. Range is checked by [`normalize_clause`] for the
/// `u64` path; floats must already lie within the safe range.
fn json_integer(n: &serde_json::Number) -> Option<u64> {
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && (0.0..=validator::MAX_SAFE_INTEGER as f64).contains(&f)).then_some(f as u64)
}
