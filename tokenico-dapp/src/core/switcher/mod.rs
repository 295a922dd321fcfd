//! Moves the wallet onto a registered network, adding the chain when the
//! wallet has never seen it.

use std::sync::Arc;

use serde_json::json;

use crate::core::registry::NetworkRegistry;
use crate::domain::NetworkConfig;
use crate::infrastructure::wallet::WalletClient;
use crate::shared::constants::{ETH_CHAIN_ID, UNRECOGNIZED_CHAIN_CODE, WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN};
use crate::shared::error::DappError;
use crate::shared::types::DappResult;
use crate::shared::utils::parse_chain_id;

#[derive(Debug, Clone)]
pub struct NetworkSwitcher {
    registry: Arc<NetworkRegistry>,
}

impl NetworkSwitcher {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// Ask the wallet to switch to `name`, falling back to adding the chain.
    pub async fn switch_network(&self, wallet: Option<&WalletClient>, name: &str) -> DappResult<&NetworkConfig> {
        let wallet = wallet.ok_or(DappError::NoWalletFound)?;
        let network = self.registry.lookup(name)?;
        let chain_id = network.chain_id_hex();

        log::info!("Switching wallet to {name} ({chain_id})");
        match wallet
            .request_raw(WALLET_SWITCH_CHAIN, json!([{ "chainId": chain_id }]))
            .await
        {
            Ok(_) => Ok(network),
            Err(e) if e.code() == Some(UNRECOGNIZED_CHAIN_CODE) => {
                log::info!("Wallet does not know {name}, adding it");
                let params = serde_json::to_value(network.add_chain_parameter())
                    .map_err(|e| DappError::config(format!("Cannot encode network {name}: {e}")))?;
                wallet
                    .request_raw(WALLET_ADD_CHAIN, json!([params]))
                    .await
                    .map_err(|e| DappError::from_host(WALLET_ADD_CHAIN, e))?;
                Ok(network)
            }
            Err(e) => {
                let err = DappError::from_host(WALLET_SWITCH_CHAIN, e);
                log::warn!("Network switch to {name} failed: {err}");
                Err(err)
            }
        }
    }

    /// Chain id the wallet is currently on
    pub async fn current_chain_id(&self, wallet: Option<&WalletClient>) -> DappResult<u64> {
        let wallet = wallet.ok_or(DappError::NoWalletFound)?;
        let raw: String = wallet
            .request(ETH_CHAIN_ID, json!([]))
            .await
            .map_err(|e| DappError::from_host(ETH_CHAIN_ID, e))?;
        parse_chain_id(&raw).map_err(|_| DappError::remote(ETH_CHAIN_ID, format!("malformed chain id {raw}")))
    }

    /// Switch only when the wallet is on some other chain.
    pub async fn ensure_network(&self, wallet: Option<&WalletClient>, name: &str) -> DappResult<&NetworkConfig> {
        let wallet = wallet.ok_or(DappError::NoWalletFound)?;
        let network = self.registry.lookup(name)?;

        let current = self.current_chain_id(Some(wallet)).await?;
        if current == network.chain_id {
            log::debug!("Wallet already on {name}");
            return Ok(network);
        }
        self.switch_network(Some(wallet), name).await
    }
}
