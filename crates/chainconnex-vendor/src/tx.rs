//! Transaction signing service.
//!
//! Options are accumulated through validating setters. `request` checks every
//! clause up front and only then hands back a future; awaiting that future
//! talks to the wallet. Malformed input is therefore always a synchronous
//! `BadParameter`, while a declined request is always an awaited `Rejected`.

use std::sync::Arc;

use chainconnex_core::clause::{clauses_from_json, normalize_clauses};
use chainconnex_core::validator::{ensure, is_address, is_bytes32, is_safe_uint};
use chainconnex_core::{Clause, ClauseInput, ConnexError, Driver, Pending, TxOptions, TxResponse};
use futures::FutureExt;
use serde_json::Value;

use crate::rejected;

pub struct TxSigningService {
    driver: Arc<dyn Driver>,
    options: TxOptions,
}

impl TxSigningService {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            options: TxOptions::default(),
        }
    }

    /// Require the transaction to be signed by `addr`.
    pub fn signer(mut self, addr: &str) -> Result<Self, ConnexError> {
        ensure(is_address(addr), "'signer' expected address type")?;
        self.options.signer = Some(addr.to_lowercase());
        Ok(self)
    }

    pub fn gas(mut self, gas: u64) -> Result<Self, ConnexError> {
        ensure(is_safe_uint(gas), "'gas' expected non-neg safe integer")?;
        self.options.gas = Some(gas);
        Ok(self)
    }

    pub fn depends_on(mut self, txid: &str) -> Result<Self, ConnexError> {
        ensure(is_bytes32(txid), "'dependsOn' expected bytes32 in hex string")?;
        self.options.depends_on = Some(txid.to_lowercase());
        Ok(self)
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.options.link = Some(url.into());
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.options.comment = Some(text.into());
        self
    }

    pub fn options(&self) -> &TxOptions {
        &self.options
    }

    /// Validate `clauses` and return the pending signature.
    pub fn request(&self, clauses: Vec<ClauseInput>) -> Result<Pending<TxResponse>, ConnexError> {
        Ok(self.submit(normalize_clauses(clauses)?))
    }

    /// [`request`](Self::request) for a JSON array of clause objects.
    pub fn request_json(&self, clauses: &Value) -> Result<Pending<TxResponse>, ConnexError> {
        Ok(self.submit(clauses_from_json(clauses)?))
    }

    fn submit(&self, clauses: Vec<Clause>) -> Pending<TxResponse> {
        let driver = Arc::clone(&self.driver);
        let options = self.options.clone();
        async move {
            tracing::debug!(clauses = clauses.len(), "Requesting transaction signature");
            let handle = driver.sign_tx(clauses, options).await.map_err(rejected)?;
            let response = handle.do_sign().await.map_err(rejected)?;
            tracing::debug!(txid = %response.txid, "Transaction signed");
            Ok::<_, ConnexError>(response)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainconnex_core::{MemoryDriver, SigningPolicy};
    use serde_json::json;

    const ADDR: &str = "0x7567D83B7B8D80ADDCB281A71D54FC7B3364FFED";

    fn approving() -> Arc<MemoryDriver> {
        let d = Arc::new(MemoryDriver::new(0));
        d.set_signing_policy(SigningPolicy::Approve {
            signer: ADDR.to_lowercase(),
        });
        d
    }

    #[test]
    fn setters_validate() {
        let svc = TxSigningService::new(approving());
        assert_eq!(
            TxSigningService::new(approving()).signer("0x12").err().unwrap().to_string(),
            "'signer' expected address type"
        );
        assert!(TxSigningService::new(approving()).gas(1 << 53).is_err());
        assert!(TxSigningService::new(approving()).depends_on("0x").is_err());

        let svc = svc
            .signer(ADDR)
            .unwrap()
            .gas(21_000)
            .unwrap()
            .link("https://example.org/tx/{txid}")
            .comment("pay");
        assert_eq!(svc.options().signer.as_deref(), Some(ADDR.to_lowercase().as_str()));
        assert_eq!(svc.options().gas, Some(21_000));
    }

    #[tokio::test]
    async fn options_snapshot_reaches_driver() {
        let d = approving();
        let svc = TxSigningService::new(d.clone()).gas(50_000).unwrap().comment("hello");
        let resp = svc
            .request(vec![ClauseInput::new().to(ADDR).value("0x10")])
            .unwrap()
            .await
            .unwrap();
        assert_eq!(resp.signer, ADDR.to_lowercase());

        let (clauses, options) = d.signed_requests().remove(0);
        assert_eq!(clauses[0].to.as_deref(), Some(ADDR.to_lowercase().as_str()));
        assert_eq!(options.gas, Some(50_000));
        assert_eq!(options.comment.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn json_request_checks_shape_first() {
        let d = approving();
        let svc = TxSigningService::new(d.clone());
        assert_eq!(
            svc.request_json(&json!({ "to": ADDR })).err().unwrap().to_string(),
            "expected array"
        );
        let err = svc
            .request_json(&json!([{ "value": 1 }, { "value": "-1" }]))
            .err()
            .unwrap();
        assert!(err.is_bad_parameter());
        assert!(err.to_string().starts_with("'#1.value'"), "{err}");
        assert_eq!(d.request_count(), 0);
    }

    #[tokio::test]
    async fn confirm_stage_rejection_is_mapped() {
        let d = Arc::new(MemoryDriver::new(0));
        d.set_signing_policy(SigningPolicy::RejectOnConfirm("user cancelled".into()));
        let err = TxSigningService::new(d)
            .request(vec![ClauseInput::new()])
            .unwrap()
            .await
            .unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(err.to_string(), "user cancelled");
    }
}
