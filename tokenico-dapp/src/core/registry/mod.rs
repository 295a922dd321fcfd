//! Network registry
//!
//! Named chain metadata the dApp can switch the wallet to. Built-in
//! entries can be extended from a JSON file and have their RPC endpoint
//! overridden per network; the registry is read-only once built.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;

use crate::domain::{NativeCurrency, NetworkConfig};
use crate::shared::error::DappError;
use crate::shared::types::DappResult;

lazy_static! {
    static ref BUILTIN_NETWORKS: BTreeMap<String, NetworkConfig> = {
        let mut networks = BTreeMap::new();
        networks.insert(
            "sepolia".to_string(),
            network(11155111, "Sepolia", ("SepoliaETH", "SepoliaETH"), "https://sepolia.infura.io/v3/", Some("https://sepolia.etherscan.io"), None),
        );
        networks.insert(
            "holesky".to_string(),
            network(17000, "Holesky", ("holesky", "ETH"), "https://rpc.ankr.com/eth_holesky", Some("https://holesky.etherscan.io/"), None),
        );
        networks.insert(
            "base_sepolia".to_string(),
            network(84532, "Base Sepolia", ("ETH", "ETH"), "https://sepolia.base.org", Some("https://sepolia.basescan.org"), None),
        );
        networks.insert(
            "neox_testnet".to_string(),
            network(
                12227332,
                "NeoX Testnet T4",
                ("GAS", "GAS"),
                "https://neoxt4seed1.ngd.network",
                Some("https://xt4scan.ngd.network/"),
                Some("wss://neoxt4wss1.ngd.network"),
            ),
        );
        networks.insert(
            "localhost".to_string(),
            network(31337, "localhost", ("GO", "GO"), "http://127.0.0.1:8545/", None, None),
        );
        networks.insert(
            "polygon_amoy".to_string(),
            network(80002, "Polygon Amoy", ("POL", "POL"), "https://rpc-amoy.polygon.technology", Some("https://amoy.polygonscan.com"), None),
        );
        networks
    };
}

fn network(
    chain_id: u64,
    chain_name: &str,
    (currency_name, symbol): (&str, &str),
    rpc_url: &str,
    explorer: Option<&str>,
    wss: Option<&str>,
) -> NetworkConfig {
    NetworkConfig {
        chain_id,
        chain_name: chain_name.to_string(),
        native_currency: NativeCurrency {
            name: currency_name.to_string(),
            symbol: symbol.to_string(),
            decimals: 18,
        },
        rpc_urls: vec![rpc_url.to_string()],
        block_explorer_urls: explorer.map(|url| vec![url.to_string()]).unwrap_or_default(),
        wss_urls: wss.map(|url| vec![url.to_string()]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: BTreeMap<String, NetworkConfig>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NetworkRegistry {
    /// Registry holding only the compiled-in networks
    pub fn builtin() -> Self {
        Self {
            networks: BUILTIN_NETWORKS.clone(),
        }
    }

    pub fn lookup(&self, name: &str) -> DappResult<&NetworkConfig> {
        self.networks
            .get(name)
            .ok_or_else(|| DappError::unknown_network(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.networks.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkConfig)> {
        self.networks.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn by_chain_id(&self, chain_id: u64) -> Option<(&str, &NetworkConfig)> {
        self.iter().find(|(_, config)| config.chain_id == chain_id)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Merge a JSON file of `name -> NetworkConfig` over the current entries.
    pub fn with_networks_file(mut self, path: impl AsRef<Path>) -> DappResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| DappError::config(format!("Cannot read networks file {}: {e}", path.display())))?;
        let extra: BTreeMap<String, NetworkConfig> = serde_json::from_str(&raw)
            .map_err(|e| DappError::config(format!("Invalid networks file {}: {e}", path.display())))?;

        for (name, config) in extra {
            if config.rpc_urls.is_empty() {
                return Err(DappError::config(format!("Network {name} has no RPC URL")));
            }
            log::debug!("networks file defines {name} (chain {})", config.chain_id);
            self.networks.insert(name, config);
        }
        Ok(self)
    }

    /// Put each override first in the matching network's RPC list.
    pub fn with_rpc_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, url) in overrides {
            match self.networks.get_mut(name) {
                Some(config) => {
                    config.rpc_urls.retain(|existing| existing != url);
                    config.rpc_urls.insert(0, url.clone());
                }
                None => log::warn!("RPC override for unknown network {name} ignored"),
            }
        }
        self
    }
}
