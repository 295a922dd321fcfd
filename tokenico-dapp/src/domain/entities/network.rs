//! Network entity for the dApp core

use serde::{Deserialize, Serialize};

use crate::shared::utils::chain_id_to_hex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Chain metadata as wallets understand it.
///
/// `chain_id` travels as a `0x` hex string on the wire; configuration files
/// may also give it as a plain integer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(with = "chain_id_serde")]
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wss_urls: Option<Vec<String>>,
}

/// EIP-3085 `wallet_addEthereumChain` parameter.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter<'a> {
    pub chain_id: String,
    pub chain_name: &'a str,
    pub native_currency: &'a NativeCurrency,
    pub rpc_urls: &'a [String],
    #[serde(skip_serializing_if = "no_urls")]
    pub block_explorer_urls: &'a [String],
}

fn no_urls(urls: &&[String]) -> bool {
    urls.is_empty()
}

impl NetworkConfig {
    pub fn chain_id_hex(&self) -> String {
        chain_id_to_hex(self.chain_id)
    }

    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    pub fn explorer_url(&self) -> Option<&str> {
        self.block_explorer_urls.first().map(String::as_str)
    }

    pub fn add_chain_parameter(&self) -> AddEthereumChainParameter<'_> {
        AddEthereumChainParameter {
            chain_id: self.chain_id_hex(),
            chain_name: &self.chain_name,
            native_currency: &self.native_currency,
            rpc_urls: &self.rpc_urls,
            block_explorer_urls: &self.block_explorer_urls,
        }
    }
}

mod chain_id_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::shared::utils::{chain_id_to_hex, parse_chain_id};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawChainId {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(chain_id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&chain_id_to_hex(*chain_id))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match RawChainId::deserialize(deserializer)? {
            RawChainId::Number(chain_id) => Ok(chain_id),
            RawChainId::Text(text) => parse_chain_id(&text).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn neox() -> NetworkConfig {
        NetworkConfig {
            chain_id: 12227332,
            chain_name: "NeoX Testnet T4".to_string(),
            native_currency: NativeCurrency {
                name: "GAS".to_string(),
                symbol: "GAS".to_string(),
                decimals: 18,
            },
            rpc_urls: vec!["https://neoxt4seed1.ngd.network".to_string()],
            block_explorer_urls: vec!["https://xt4scan.ngd.network/".to_string()],
            wss_urls: Some(vec!["wss://neoxt4wss1.ngd.network".to_string()]),
        }
    }

    #[test]
    fn test_chain_id_serializes_as_hex() {
        let value = serde_json::to_value(neox()).unwrap();
        assert_eq!(value["chainId"], json!("0xba9304"));
        assert_eq!(value["wssUrls"][0], json!("wss://neoxt4wss1.ngd.network"));

        let back: NetworkConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, neox());
    }

    #[test]
    fn test_chain_id_accepts_integer() {
        let config: NetworkConfig = serde_json::from_value(json!({
            "chainId": 31337,
            "chainName": "localhost",
            "nativeCurrency": { "name": "GO", "symbol": "GO", "decimals": 18 },
            "rpcUrls": ["http://127.0.0.1:8545/"]
        }))
        .unwrap();
        assert_eq!(config.chain_id, 31337);
        assert!(config.block_explorer_urls.is_empty());
        assert!(config.wss_urls.is_none());
    }

    #[test]
    fn test_add_chain_parameter_omits_wss_urls() {
        let network = neox();
        let value = serde_json::to_value(network.add_chain_parameter()).unwrap();
        assert_eq!(value["chainId"], json!("0xba9304"));
        assert_eq!(value["nativeCurrency"]["symbol"], json!("GAS"));
        assert!(value.get("wssUrls").is_none());
    }
}
