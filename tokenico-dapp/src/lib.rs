//! TokenICO dApp core
//!
//! Client-side plumbing for the TokenICO token sale: the network registry,
//! wallet connection through an injected EIP-1193 wallet, contract binding,
//! balance and token readers, and the application state the UI renders.
//!
//! ## Architecture
//!
//! - **Core**: registry, switcher, wallet connector, contracts, readers, state
//! - **Domain**: networks, wallet sessions, token and sale snapshots
//! - **Infrastructure**: configuration, logging, the wallet transport
//! - **Shared**: errors, constants, common types and utilities
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokenico_dapp::{AppState, DappConfig, HttpWallet, WalletHost};
//!
//! # async fn run() -> Result<(), tokenico_dapp::DappError> {
//! let config = DappConfig::from_env()?;
//! let wallet: Arc<dyn WalletHost> = Arc::new(HttpWallet::new("http://127.0.0.1:8545"));
//! let state = AppState::new(config, Some(wallet))?;
//!
//! let dashboard = state.load_dashboard().await?;
//! println!("{} sells at {} {}", dashboard.symbol, dashboard.token_price, dashboard.currency);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export specific components
pub use crate::core::contracts::{ContractFactory, ContractHandle, ContractKind};
pub use crate::core::registry::NetworkRegistry;
pub use crate::core::state::AppState;
pub use crate::core::switcher::NetworkSwitcher;
pub use crate::core::wallet::WalletConnector;

// Re-export domain entities
pub use crate::domain::{NativeCurrency, NetworkConfig, SaleDetails, SaleState, TokenInfo, WalletSession};

// Re-export infrastructure
pub use crate::infrastructure::{init_logger, DappConfig, HostError, HttpWallet, Timeouts, WalletHost, WalletSigner};

// Re-export shared types
pub use crate::shared::error::DappError;
pub use crate::shared::types::{ConnectOutcome, Dashboard, DappResult, TransactionOutcome, UiState};

/// Initialize logging with the default level; `RUST_LOG` overrides it.
pub fn init() {
    init_logger(shared::constants::LOG_LEVEL);
}

/// Load configuration from `.env` and the environment, start logging and
/// build the application state.
///
/// The wallet is the JSON-RPC endpoint in `TOKENICO_WALLET_RPC_URL`; without
/// one the state reports `NoWalletFound` for every wallet operation.
pub fn init_dapp() -> DappResult<AppState> {
    let config = DappConfig::from_env()?;
    init_logger(&config.log_level);

    for problem in config.validate() {
        log::warn!("Configuration: {problem}");
    }

    let host: Option<Arc<dyn WalletHost>> = match &config.wallet_rpc_url {
        Some(url) => {
            log::info!("Using wallet node at {url}");
            let wallet: Arc<dyn WalletHost> = Arc::new(HttpWallet::new(url.clone()));
            Some(wallet)
        }
        None => {
            log::info!("No wallet configured");
            None
        }
    };

    AppState::new(config, host)
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_metadata() {
        assert_eq!(NAME, "tokenico-dapp");
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_state_without_wallet() {
        init();
        let state = AppState::new(DappConfig::default(), None).unwrap();
        assert!(!state.connector().has_wallet());

        let result = tokio_test::block_on(state.check_wallet_connected());
        assert_eq!(result, Err(DappError::NoWalletFound));
    }
}
