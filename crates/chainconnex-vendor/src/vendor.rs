//! `Vendor`: the wallet-facing façade.

use std::sync::Arc;

use chainconnex_core::validator::{ensure, is_address};
use chainconnex_core::{ConnexError, Driver, PollerConfig};

use crate::cert::CertSigningService;
use crate::poller::OwnedAddressPoller;
use crate::tx::TxSigningService;

/// A signing service picked by message kind.
pub enum SigningService {
    Tx(TxSigningService),
    Cert(CertSigningService),
}

impl SigningService {
    pub fn into_tx(self) -> Option<TxSigningService> {
        match self {
            Self::Tx(svc) => Some(svc),
            Self::Cert(_) => None,
        }
    }

    pub fn into_cert(self) -> Option<CertSigningService> {
        match self {
            Self::Cert(svc) => Some(svc),
            Self::Tx(_) => None,
        }
    }
}

pub struct Vendor {
    driver: Arc<dyn Driver>,
    poller: OwnedAddressPoller,
}

impl Vendor {
    /// Must be called from within a Tokio runtime; starts the owned-address poller.
    pub fn new(driver: Arc<dyn Driver>, config: PollerConfig) -> Self {
        let poller = OwnedAddressPoller::spawn(Arc::clone(&driver), config);
        Self { driver, poller }
    }

    /// `"tx"` or `"cert"`.
    pub fn sign(&self, kind: &str) -> Result<SigningService, ConnexError> {
        match kind {
            "tx" => Ok(SigningService::Tx(self.sign_tx())),
            "cert" => Ok(SigningService::Cert(self.sign_cert())),
            _ => Err(ConnexError::bad_parameter("unsupported message kind")),
        }
    }

    pub fn sign_tx(&self) -> TxSigningService {
        TxSigningService::new(Arc::clone(&self.driver))
    }

    pub fn sign_cert(&self) -> CertSigningService {
        CertSigningService::new(Arc::clone(&self.driver))
    }

    /// Whether the connected wallet controls `addr`, per the latest poll.
    pub fn owned(&self, addr: &str) -> Result<bool, ConnexError> {
        ensure(is_address(addr), "expected address type")?;
        Ok(self.poller.contains(addr))
    }
}
