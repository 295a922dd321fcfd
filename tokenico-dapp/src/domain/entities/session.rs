//! Wallet session entity

use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::shared::utils::address_to_string;

/// An authorized account on the active chain.
///
/// Lives until an explicit disconnect; persistence is the wallet's business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletSession {
    pub account: Address,
    pub chain_id: u64,
    pub connected_at: DateTime<Utc>,
}

impl WalletSession {
    pub fn new(account: Address, chain_id: u64) -> Self {
        Self {
            account,
            chain_id,
            connected_at: Utc::now(),
        }
    }

    /// Lower-case `0x` form of the account
    pub fn account_string(&self) -> String {
        address_to_string(&self.account)
    }

    /// Same account on the same chain, ignoring when it connected.
    pub fn same_identity(&self, other: &WalletSession) -> bool {
        self.account == other.account && self.chain_id == other.chain_id
    }
}
