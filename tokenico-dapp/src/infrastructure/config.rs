//! Runtime configuration
//!
//! Values come from the process environment (after loading `.env`), with
//! the NeoX T4 deployment as defaults.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::core::registry::NetworkRegistry;
use crate::shared::constants::*;
use crate::shared::error::DappError;
use crate::shared::types::DappResult;
use crate::shared::utils::{parse_address, validate_ethereum_address};

/// Limits for wallet requests and transaction confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub request: Duration,
    pub prompt: Duration,
    pub transaction: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_millis(REQUEST_TIMEOUT_MS),
            prompt: Duration::from_millis(PROMPT_TIMEOUT_MS),
            transaction: Duration::from_millis(TRANSACTION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappConfig {
    pub dapp_name: String,
    /// Registry name of the chain the wallet is switched to
    pub network: String,
    pub networks_file: Option<String>,
    pub token_ico_address: String,
    pub token_address: String,
    pub owner_address: String,
    pub token_ico_abi_path: String,
    pub erc20_abi_path: String,
    /// JSON-RPC endpoint with unlocked accounts, used instead of a browser wallet
    pub wallet_rpc_url: Option<String>,
    pub log_level: String,
    pub timeouts: Timeouts,
    /// Registry name -> RPC URL, from `TOKENICO_RPC_<NAME>`
    pub rpc_overrides: BTreeMap<String, String>,
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            dapp_name: DAPP_NAME.to_string(),
            network: DEFAULT_NETWORK.to_string(),
            networks_file: None,
            token_ico_address: CONTRACT_ADDRESS.to_string(),
            token_address: TOKEN_ADDRESS.to_string(),
            owner_address: OWNER_ADDRESS.to_string(),
            token_ico_abi_path: TOKEN_ICO_ABI_PATH.to_string(),
            erc20_abi_path: ERC20_ABI_PATH.to_string(),
            wallet_rpc_url: None,
            log_level: LOG_LEVEL.to_string(),
            timeouts: Timeouts::default(),
            rpc_overrides: BTreeMap::new(),
        }
    }
}

impl DappConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> DappResult<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(env::vars())
    }

    /// Build a config from `(name, value)` pairs; unknown names are ignored.
    pub fn from_vars<I>(vars: I) -> DappResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }

            match key.as_str() {
                ENV_NETWORK => config.network = value,
                ENV_NETWORKS_FILE => config.networks_file = Some(value),
                ENV_CONTRACT_ADDRESS => config.token_ico_address = value,
                ENV_TOKEN_ADDRESS => config.token_address = value,
                ENV_OWNER_ADDRESS => config.owner_address = value,
                ENV_ICO_ABI => config.token_ico_abi_path = value,
                ENV_ERC20_ABI => config.erc20_abi_path = value,
                ENV_WALLET_RPC_URL => config.wallet_rpc_url = Some(value),
                ENV_LOG_LEVEL => config.log_level = value,
                ENV_REQUEST_TIMEOUT_MS => config.timeouts.request = parse_millis(&key, &value)?,
                ENV_PROMPT_TIMEOUT_MS => config.timeouts.prompt = parse_millis(&key, &value)?,
                ENV_TX_TIMEOUT_MS => config.timeouts.transaction = parse_millis(&key, &value)?,
                ENV_POLL_INTERVAL_MS => config.timeouts.poll_interval = parse_millis(&key, &value)?,
                _ => {
                    if let Some(name) = key.strip_prefix(ENV_RPC_PREFIX) {
                        config.rpc_overrides.insert(name.to_ascii_lowercase(), value);
                    }
                }
            }
        }

        Ok(config)
    }

    /// Expected sale owner, checked against `owner()` when the dashboard loads.
    pub fn configured_owner(&self) -> Option<Address> {
        parse_address(&self.owner_address).ok()
    }

    /// Problems that would make the dApp misbehave; empty when usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (label, address) in [
            ("token sale contract", &self.token_ico_address),
            ("token", &self.token_address),
            ("owner", &self.owner_address),
        ] {
            if let Err(e) = validate_ethereum_address(address) {
                errors.push(format!("Invalid {label} address: {e}"));
            }
        }

        if self.network.is_empty() {
            errors.push("Target network is required".to_string());
        }

        if self.timeouts.request.is_zero() || self.timeouts.prompt.is_zero() || self.timeouts.transaction.is_zero() {
            errors.push("Timeouts must be greater than zero".to_string());
        }
        if self.timeouts.poll_interval.is_zero() {
            errors.push("Receipt poll interval must be greater than zero".to_string());
        }

        if let Some(url) = &self.wallet_rpc_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(format!("Wallet RPC URL must be http(s): {url}"));
            }
        }

        errors
    }

    /// Effective registry: built-ins, then the networks file, then RPC overrides.
    pub fn registry(&self) -> DappResult<NetworkRegistry> {
        let mut registry = NetworkRegistry::builtin();
        if let Some(path) = &self.networks_file {
            registry = registry.with_networks_file(path)?;
        }
        let registry = registry.with_rpc_overrides(&self.rpc_overrides);

        registry.lookup(&self.network)?;
        Ok(registry)
    }
}

fn parse_millis(key: &str, value: &str) -> DappResult<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| DappError::config(format!("{key} must be a number of milliseconds, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = DappConfig::from_vars(Vec::new()).unwrap();
        assert_eq!(config, DappConfig::default());
        assert_eq!(config.network, "neox_testnet");
        assert_eq!(config.configured_owner(), Some(OWNER_ADDRESS.parse().unwrap()));
        assert!(config.validate().is_empty());
        assert!(config.registry().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = DappConfig::from_vars(vars(&[
            ("TOKENICO_NETWORK", "localhost"),
            ("TOKENICO_WALLET_RPC_URL", "http://127.0.0.1:8545"),
            ("TOKENICO_REQUEST_TIMEOUT_MS", "500"),
            ("TOKENICO_RPC_SEPOLIA", "https://rpc.sepolia.org"),
            ("TOKENICO_OWNER_ADDRESS", ""),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        assert_eq!(config.network, "localhost");
        assert_eq!(config.wallet_rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert_eq!(config.timeouts.request, Duration::from_millis(500));
        assert_eq!(config.owner_address, OWNER_ADDRESS);
        assert_eq!(config.rpc_overrides.get("sepolia").map(String::as_str), Some("https://rpc.sepolia.org"));

        let registry = config.registry().unwrap();
        assert_eq!(registry.lookup("sepolia").unwrap().primary_rpc_url(), Some("https://rpc.sepolia.org"));
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let result = DappConfig::from_vars(vars(&[("TOKENICO_TX_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(DappError::Config(_))));
    }

    #[test]
    fn test_validate_collects_problems() {
        let config = DappConfig {
            token_address: "0x1234".to_string(),
            wallet_rpc_url: Some("ftp://node".to_string()),
            timeouts: Timeouts {
                poll_interval: Duration::ZERO,
                ..Timeouts::default()
            },
            ..DappConfig::default()
        };

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("token address"));
    }

    #[test]
    fn test_malformed_owner_is_not_checked() {
        let config = DappConfig {
            owner_address: "owner".to_string(),
            ..DappConfig::default()
        };
        assert_eq!(config.configured_owner(), None);
        assert!(config.validate()[0].contains("owner address"));
    }

    #[test]
    fn test_unknown_target_network() {
        let config = DappConfig {
            network: "mainnet".to_string(),
            ..DappConfig::default()
        };
        assert_eq!(config.registry(), Err(DappError::unknown_network("mainnet")));
    }
}
