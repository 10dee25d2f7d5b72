//! # chainconnex-vendor
//!
//! The wallet side of ChainConnex: transaction and certificate signing
//! services plus a cached view of the addresses the wallet controls.
//!
//! ```ignore
//! let vendor = Vendor::new(driver, PollerConfig::default());
//! let pending = vendor.sign_tx().gas(50_000)?.request(clauses)?; // BadParameter here
//! let signed = pending.await?;                                   // Rejected here
//! ```

pub mod cert;
pub mod poller;
pub mod tx;
pub mod vendor;

pub use cert::CertSigningService;
pub use poller::OwnedAddressPoller;
pub use tx::TxSigningService;
pub use vendor::{SigningService, Vendor};

use chainconnex_core::{ConnexError, DriverError};

/// Any wallet-side failure is reported to the caller as a rejection,
/// carrying the driver's message text unchanged.
pub(crate) fn rejected(err: DriverError) -> ConnexError {
    let message = match err {
        DriverError::Transport(m)
        | DriverError::Declined(m)
        | DriverError::NotFound(m)
        | DriverError::Other(m) => m,
    };
    ConnexError::Rejected(message)
}
