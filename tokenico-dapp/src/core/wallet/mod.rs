//! Wallet connection for the dApp
//!
//! Tracks which account the injected wallet has authorized and hands out
//! ethers providers that sign through it.

use std::sync::{Arc, PoisonError, RwLock as SyncRwLock};

use ethers::providers::Provider;
use serde_json::json;
use tokio::sync::RwLock;

use crate::core::registry::NetworkRegistry;
use crate::core::switcher::NetworkSwitcher;
use crate::domain::{NetworkConfig, TokenInfo, WalletSession};
use crate::infrastructure::config::Timeouts;
use crate::infrastructure::wallet::{WalletClient, WalletHost, WalletSigner, WalletTransport};
use crate::shared::constants::{ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS, WALLET_WATCH_ASSET};
use crate::shared::error::DappError;
use crate::shared::types::{ConnectOutcome, DappResult};
use crate::shared::utils::parse_address;

/// Wallet connector holding the current session
pub struct WalletConnector {
    wallet: Option<WalletClient>,
    switcher: NetworkSwitcher,
    target_network: SyncRwLock<String>,
    session: RwLock<Option<WalletSession>>,
}

impl WalletConnector {
    /// `host` is `None` when no wallet is installed.
    pub fn new(
        host: Option<Arc<dyn WalletHost>>,
        registry: Arc<NetworkRegistry>,
        target_network: impl Into<String>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            wallet: host.map(|host| WalletClient::new(host, timeouts)),
            switcher: NetworkSwitcher::new(registry),
            target_network: SyncRwLock::new(target_network.into()),
            session: RwLock::new(None),
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// The wallet client, or `NoWalletFound` before anything goes out.
    pub fn client(&self) -> DappResult<&WalletClient> {
        self.wallet.as_ref().ok_or(DappError::NoWalletFound)
    }

    /// Network the dApp keeps the wallet on; follows explicit switches.
    pub fn target_network(&self) -> String {
        self.target_network.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn registry(&self) -> &NetworkRegistry {
        self.switcher.registry()
    }

    /// Registry entry of the target network
    pub fn network(&self) -> DappResult<&NetworkConfig> {
        self.registry().lookup(&self.target_network())
    }

    pub async fn session(&self) -> Option<WalletSession> {
        self.session.read().await.clone()
    }

    /// Session for an already-authorized account, without prompting for one.
    pub async fn ensure_connected(&self) -> DappResult<WalletSession> {
        let wallet = self.client()?;
        let target = self.target_network();
        let network = self.switcher.ensure_network(Some(wallet), &target).await?;

        let accounts: Vec<String> = wallet
            .request(ETH_ACCOUNTS, json!([]))
            .await
            .map_err(|e| DappError::from_host(ETH_ACCOUNTS, e))?;
        let account = accounts
            .first()
            .ok_or_else(|| DappError::not_authorized("no account authorized for this dApp; connect the wallet"))?;

        let session = WalletSession::new(parse_address(account)?, network.chain_id);
        Ok(self.store(session).await)
    }

    /// Ask the wallet to authorize an account.
    pub async fn connect(&self) -> DappResult<ConnectOutcome> {
        let wallet = self.client()?;
        let target = self.target_network();
        let network = self.switcher.ensure_network(Some(wallet), &target).await?;

        let accounts: Vec<String> = wallet
            .request(ETH_REQUEST_ACCOUNTS, json!([]))
            .await
            .map_err(|e| {
                let err = DappError::from_host(ETH_REQUEST_ACCOUNTS, e);
                log::warn!("Wallet connection failed: {err}");
                err
            })?;
        let account = accounts
            .first()
            .ok_or_else(|| DappError::not_authorized("wallet returned no accounts"))?;

        let session = self.store(WalletSession::new(parse_address(account)?, network.chain_id)).await;
        log::info!("Connected {} on {target}", session.account_string());

        Ok(ConnectOutcome {
            session,
            refresh_required: true,
        })
    }

    pub async fn disconnect(&self) {
        if let Some(session) = self.session.write().await.take() {
            log::info!("Disconnected {}", session.account_string());
        }
    }

    /// Explicit switch requested by the user. `name` becomes the target
    /// network and the session is re-read on next use.
    pub async fn switch_network(&self, name: &str) -> DappResult<NetworkConfig> {
        let wallet = self.client()?;
        let network = self.switcher.switch_network(Some(wallet), name).await?.clone();
        *self.target_network.write().unwrap_or_else(PoisonError::into_inner) = name.to_string();
        *self.session.write().await = None;
        Ok(network)
    }

    /// Provider over the wallet with the session account as default sender.
    pub async fn signer(&self) -> DappResult<Arc<WalletSigner>> {
        let wallet = self.client()?;
        let session = match self.session().await {
            Some(session) => session,
            None => self.ensure_connected().await?,
        };

        let provider = Provider::new(WalletTransport::new(wallet.clone())).with_sender(session.account);
        Ok(Arc::new(provider))
    }

    /// Suggest the token to the wallet (EIP-747); `false` if the user declined to add it.
    pub async fn watch_asset(&self, token: &TokenInfo) -> DappResult<bool> {
        let wallet = self.client()?;
        let params = json!({
            "type": "ERC20",
            "options": {
                "address": token.address,
                "symbol": token.symbol,
                "decimals": token.decimals,
                "image": ""
            }
        });

        let added: bool = wallet
            .request(WALLET_WATCH_ASSET, params)
            .await
            .map_err(|e| DappError::from_host(WALLET_WATCH_ASSET, e))?;
        log::info!("Token {} {}", token.symbol, if added { "added to wallet" } else { "not added" });
        Ok(added)
    }

    async fn store(&self, session: WalletSession) -> WalletSession {
        let mut current = self.session.write().await;
        match current.as_ref() {
            Some(existing) if existing.same_identity(&session) => existing.clone(),
            _ => {
                log::info!("Wallet session {} on chain {}", session.account_string(), session.chain_id);
                *current = Some(session.clone());
                session
            }
        }
    }
}
