use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::WalletSession;

pub type DisplayAmount = String;
pub type TransactionHash = String;

/// Result of an explicit connection request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectOutcome {
    pub session: WalletSession,
    /// Dependent state (balances, handles) must be reloaded after a connect.
    pub refresh_required: bool,
}

/// A mined transaction submitted through the wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub hash: TransactionHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<String>,
}

/// Display-ready snapshot combining sale state and wallet state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub token_bal: DisplayAmount,
    pub name: String,
    pub symbol: String,
    pub supply: DisplayAmount,
    pub token_price: DisplayAmount,
    pub token_addr: String,
    pub native_balance: DisplayAmount,
    pub currency: String,
    pub network: String,
    pub chain_id: u64,
    pub address: String,
    pub owner: String,
    pub is_owner: bool,
    pub sold_tokens: String,
    pub loaded_at: DateTime<Utc>,
}

/// UI-facing state held by the application state provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiState {
    pub loading: bool,
    pub account: Option<String>,
    /// Bumped whenever dependent state should be refreshed.
    pub count: u64,
}

// Result types for better error handling
pub type DappResult<T> = Result<T, crate::shared::error::DappError>;
