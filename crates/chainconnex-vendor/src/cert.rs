//! Certificate signing service.

use std::sync::Arc;

use chainconnex_core::validator::{ensure, is_address};
use chainconnex_core::{
    CertMessage, CertOptions, CertPurpose, CertResponse, ConnexError, Driver, Pending,
};
use futures::FutureExt;
use serde_json::Value;

use crate::rejected;

pub struct CertSigningService {
    driver: Arc<dyn Driver>,
    options: CertOptions,
}

impl CertSigningService {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            options: CertOptions::default(),
        }
    }

    pub fn signer(mut self, addr: &str) -> Result<Self, ConnexError> {
        ensure(is_address(addr), "'signer' expected address type")?;
        self.options.signer = Some(addr.to_lowercase());
        Ok(self)
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.options.link = Some(url.into());
        self
    }

    pub fn options(&self) -> &CertOptions {
        &self.options
    }

    /// Ask the wallet to sign `message`.
    pub fn request(&self, message: CertMessage) -> Result<Pending<CertResponse>, ConnexError> {
        Ok(self.submit(message))
    }

    /// [`request`](Self::request) for a loosely typed JSON message.
    pub fn request_json(&self, message: &Value) -> Result<Pending<CertResponse>, ConnexError> {
        Ok(self.submit(message_from_json(message)?))
    }

    fn submit(&self, message: CertMessage) -> Pending<CertResponse> {
        let driver = Arc::clone(&self.driver);
        let options = self.options.clone();
        async move {
            tracing::debug!(purpose = ?message.purpose, "Requesting certificate signature");
            driver.sign_cert(message, options).await.map_err(rejected)
        }
        .boxed()
    }
}

fn message_from_json(value: &Value) -> Result<CertMessage, ConnexError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ConnexError::bad_parameter("expected object"))?;

    let purpose = match obj.get("purpose").and_then(Value::as_str) {
        Some("agreement") => CertPurpose::Agreement,
        Some("identification") => CertPurpose::Identification,
        _ => {
            return Err(ConnexError::bad_parameter(
                "'purpose' expected 'agreement' or 'identification'",
            ))
        }
    };

    let payload = obj
        .get("payload")
        .and_then(Value::as_object)
        .ok_or_else(|| ConnexError::bad_parameter("'payload' expected object"))?;
    ensure(
        payload.get("type").and_then(Value::as_str) == Some("text"),
        "'payload.type' unsupported",
    )?;
    let content = payload
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ConnexError::bad_parameter("'payload.content' expected string"))?;

    Ok(CertMessage::text(purpose, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainconnex_core::{MemoryDriver, SigningPolicy};
    use serde_json::json;

    fn err_of(v: Value) -> String {
        message_from_json(&v).unwrap_err().to_string()
    }

    #[test]
    fn json_message_checks_in_order() {
        assert_eq!(err_of(json!([])), "expected object");
        assert_eq!(
            err_of(json!({ "purpose": "login" })),
            "'purpose' expected 'agreement' or 'identification'"
        );
        assert_eq!(err_of(json!({ "purpose": "agreement" })), "'payload' expected object");
        assert_eq!(
            err_of(json!({ "purpose": "agreement", "payload": { "type": "html", "content": "" } })),
            "'payload.type' unsupported"
        );
        assert_eq!(
            err_of(json!({ "purpose": "agreement", "payload": { "type": "text", "content": 1 } })),
            "'payload.content' expected string"
        );
    }

    #[test]
    fn json_message_parses() {
        let msg = message_from_json(&json!({
            "purpose": "identification",
            "payload": { "type": "text", "content": "hi" }
        }))
        .unwrap();
        assert_eq!(msg, CertMessage::text(CertPurpose::Identification, "hi"));
    }

    #[tokio::test]
    async fn approved_cert_carries_signer() {
        let d = Arc::new(MemoryDriver::new(1_234));
        d.set_signing_policy(SigningPolicy::Approve {
            signer: "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed".into(),
        });
        let resp = CertSigningService::new(d)
            .request(CertMessage::text(CertPurpose::Agreement, "terms"))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(resp.annex.signer, "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed");
        assert_eq!(resp.annex.timestamp, 1_234);
        assert!(resp.signature.starts_with("0x"));
    }

    #[tokio::test]
    async fn declined_cert_is_rejected() {
        let d = Arc::new(MemoryDriver::new(0));
        d.set_signing_policy(SigningPolicy::Reject("nope".into()));
        let err = CertSigningService::new(d)
            .request(CertMessage::text(CertPurpose::Agreement, "terms"))
            .unwrap()
            .await
            .unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(err.to_string(), "nope");
    }
}
