//! Signing request options, certificate messages and wallet responses.

use serde::{Deserialize, Serialize};

// ─── Transactions ────────────────────────────────────────────────────────────

/// Options accumulated by the transaction signing service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Callback URL the wallet opens once the transaction is sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub txid: String,
    pub signer: String,
}

// ─── Certificates ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertPurpose {
    Agreement,
    Identification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    #[default]
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertPayload {
    #[serde(rename = "type")]
    pub kind: PayloadType,
    pub content: String,
}

/// A message the user is asked to sign as a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertMessage {
    pub purpose: CertPurpose,
    pub payload: CertPayload,
}

impl CertMessage {
    /// A plain-text certificate message.
    pub fn text(purpose: CertPurpose, content: impl Into<String>) -> Self {
        Self {
            purpose,
            payload: CertPayload {
                kind: PayloadType::Text,
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CertOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertAnnex {
    pub domain: String,
    pub timestamp: u64,
    pub signer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertResponse {
    pub annex: CertAnnex,
    pub signature: String,
}

// ─── VM simulation ───────────────────────────────────────────────────────────

/// Caller-side context for simulating clauses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cert_message_wire_shape() {
        let msg = CertMessage::text(CertPurpose::Identification, "hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["purpose"], "identification");
        assert_eq!(json["payload"]["type"], "text");
        assert_eq!(json["payload"]["content"], "hello");
    }

    #[test]
    fn tx_options_skip_unset() {
        let opts = TxOptions {
            gas: Some(21_000),
            ..Default::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(json, r#"{"gas":21000}"#);
    }
}
