//! Contract factory
//!
//! Loads ABI descriptors and binds them to deployed addresses. Binding is
//! local; no request reaches the wallet until a method is called.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::types::Address;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::WalletSession;
use crate::infrastructure::wallet::WalletSigner;
use crate::shared::constants::*;
use crate::shared::error::DappError;
use crate::shared::types::DappResult;
use crate::shared::utils::parse_address;

/// A contract bound to an address and signing through the wallet.
pub type ContractHandle = Contract<WalletSigner>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    TokenSale,
    Erc20,
}

impl ContractKind {
    /// Functions the dApp calls on this kind of contract
    pub fn required_functions(&self) -> &'static [&'static str] {
        match self {
            ContractKind::TokenSale => &[
                FN_GET_TOKEN_DETAILS,
                FN_OWNER,
                FN_SOLD_TOKENS,
                FN_BUY_TOKEN,
                FN_WITHDRAW_ALL_TOKENS,
                FN_UPDATE_TOKEN,
                FN_UPDATE_TOKEN_SALE_PRICE,
                FN_TRANSFER_TO_OWNER,
                FN_TRANSFER_ETHER,
            ],
            ContractKind::Erc20 => &[
                FN_NAME,
                FN_SYMBOL,
                FN_DECIMALS,
                FN_TOTAL_SUPPLY,
                FN_BALANCE_OF,
                FN_TRANSFER,
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContractKind::TokenSale => "TokenICO",
            ContractKind::Erc20 => "ERC20",
        }
    }
}

/// Parse a Hardhat artifact (`{"abi": [...]}`) or a bare ABI array.
pub fn parse_abi(raw: &str) -> DappResult<Abi> {
    let value: Value = serde_json::from_str(raw).map_err(|e| DappError::abi_load(format!("malformed JSON: {e}")))?;

    let abi_value = match value {
        array @ Value::Array(_) => array,
        Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| DappError::invalid_abi("artifact has no `abi` field"))?,
        other => {
            return Err(DappError::invalid_abi(format!(
                "expected an ABI array or artifact, found {}",
                json_kind(&other)
            )))
        }
    };

    serde_json::from_value(abi_value).map_err(|e| DappError::invalid_abi(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn load_abi(path: impl AsRef<Path>) -> DappResult<Abi> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| DappError::abi_load(format!("{}: {e}", path.display())))?;
    parse_abi(&raw).map_err(|e| match e {
        DappError::AbiLoad(message) => DappError::abi_load(format!("{}: {message}", path.display())),
        other => other,
    })
}

pub fn require_functions(abi: &Abi, names: &[&str]) -> DappResult<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| abi.function(name).is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DappError::invalid_abi(format!("missing functions: {}", missing.join(", "))))
    }
}

/// Load an ABI file and check it exposes everything `kind` needs.
pub fn load_abi_for(path: impl AsRef<Path>, kind: ContractKind) -> DappResult<Abi> {
    let abi = load_abi(path)?;
    require_functions(&abi, kind.required_functions())
        .map_err(|e| DappError::invalid_abi(format!("{} ABI: {e}", kind.label())))?;
    Ok(abi)
}

/// Bind `abi` at `address`. Pure; fails only on a malformed address.
pub fn get_contract(address: &str, abi: &Abi, signer: Arc<WalletSigner>) -> DappResult<ContractHandle> {
    let address = parse_address(address)?;
    Ok(Contract::new(address, abi.clone(), signer))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: ContractKind,
    address: Address,
    account: Address,
    chain_id: u64,
}

/// Contract handles cached for the current session.
#[derive(Default)]
pub struct ContractFactory {
    cache: RwLock<HashMap<CacheKey, ContractHandle>>,
}

impl ContractFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached handle for this session, built on first use.
    ///
    /// Handles bound to another account or chain are dropped.
    pub async fn get_or_create(
        &self,
        kind: ContractKind,
        address: &str,
        abi: &Abi,
        signer: Arc<WalletSigner>,
        session: &WalletSession,
    ) -> DappResult<ContractHandle> {
        let key = CacheKey {
            kind,
            address: parse_address(address)?,
            account: session.account,
            chain_id: session.chain_id,
        };

        if let Some(handle) = self.cache.read().await.get(&key) {
            return Ok(handle.clone());
        }

        let handle = get_contract(address, abi, signer)?;
        let mut cache = self.cache.write().await;
        cache.retain(|cached, _| cached.account == key.account && cached.chain_id == key.chain_id);
        cache.insert(key, handle.clone());
        log::debug!("{} handle bound at {address}", kind.label());
        Ok(handle)
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}
