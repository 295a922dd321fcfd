//! Token and sale entities

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Read-only ERC-20 snapshot, amounts already scaled by `decimals`.
///
/// Fields come from separate calls and are not read atomically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supply: String,
    pub balance: String,
    pub chain_id: u64,
}

/// Raw output of the sale contract's `getTokenDetails`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDetails {
    pub name: String,
    pub symbol: String,
    /// Tokens held by the sale contract, in base units
    pub balance: U256,
    pub supply: U256,
    /// Native-currency wei per whole token
    pub token_price: U256,
    pub token_address: Address,
}

impl From<(String, String, U256, U256, U256, Address)> for SaleDetails {
    fn from(raw: (String, String, U256, U256, U256, Address)) -> Self {
        let (name, symbol, balance, supply, token_price, token_address) = raw;
        Self {
            name,
            symbol,
            balance,
            supply,
            token_price,
            token_address,
        }
    }
}

/// Sale details together with ownership and progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleState {
    pub details: SaleDetails,
    pub owner: Address,
    pub sold_tokens: U256,
}
