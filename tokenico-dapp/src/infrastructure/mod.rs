//! Infrastructure layer - configuration, logging and the wallet transport
//!
//! Everything that touches the process environment or the outside world
//! through the wallet lives here.

pub mod config;
pub mod logger;
pub mod wallet;

// Re-export infrastructure components
pub use config::{DappConfig, Timeouts};
pub use logger::init_logger;
pub use wallet::{HostError, HttpWallet, WalletClient, WalletHost, WalletSigner, WalletTransport};
