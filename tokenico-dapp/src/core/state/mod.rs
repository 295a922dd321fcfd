//! Application state provider
//!
//! One `AppState` is created at start and shared by every view. It owns the
//! wallet connector, the contract factory and the loaded ABIs, and runs the
//! dashboard load and the user actions one at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use ethers::abi::{Abi, Tokenize};
use ethers::types::U256;
use tokio::sync::RwLock;

use crate::core::contracts::{load_abi_for, ContractFactory, ContractHandle, ContractKind};
use crate::core::readers;
use crate::core::registry::NetworkRegistry;
use crate::core::wallet::WalletConnector;
use crate::domain::{NetworkConfig, SaleState, TokenInfo, WalletSession};
use crate::infrastructure::config::DappConfig;
use crate::infrastructure::wallet::{WalletHost, WalletSigner};
use crate::shared::constants::*;
use crate::shared::error::DappError;
use crate::shared::types::{ConnectOutcome, Dashboard, DappResult, TransactionOutcome, UiState};
use crate::shared::utils::{address_to_string, format_amount, parse_address, parse_positive_amount};

/// Holds `loading` for one action and clears it on every exit path.
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> DappResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DappError::Busy)?;
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A bound handle together with what it was bound for.
struct Bound {
    session: WalletSession,
    signer: Arc<WalletSigner>,
    contract: ContractHandle,
}

pub struct AppState {
    config: DappConfig,
    connector: WalletConnector,
    contracts: ContractFactory,
    token_sale_abi: Abi,
    erc20_abi: Abi,
    ui: RwLock<UiState>,
    loading: Arc<AtomicBool>,
}

impl AppState {
    /// Build the state from configuration, loading both ABI files.
    pub fn new(config: DappConfig, host: Option<Arc<dyn WalletHost>>) -> DappResult<Self> {
        let registry = config.registry()?;
        let token_sale_abi = load_abi_for(&config.token_ico_abi_path, ContractKind::TokenSale)?;
        let erc20_abi = load_abi_for(&config.erc20_abi_path, ContractKind::Erc20)?;
        Ok(Self::with_abis(config, registry, host, token_sale_abi, erc20_abi))
    }

    pub fn with_abis(
        config: DappConfig,
        registry: NetworkRegistry,
        host: Option<Arc<dyn WalletHost>>,
        token_sale_abi: Abi,
        erc20_abi: Abi,
    ) -> Self {
        let connector = WalletConnector::new(host, Arc::new(registry), config.network.clone(), config.timeouts);
        Self {
            config,
            connector,
            contracts: ContractFactory::new(),
            token_sale_abi,
            erc20_abi,
            ui: RwLock::new(UiState::default()),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &DappConfig {
        &self.config
    }

    pub fn connector(&self) -> &WalletConnector {
        &self.connector
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn ui_state(&self) -> UiState {
        let mut state = self.ui.read().await.clone();
        state.loading = self.is_loading();
        state
    }

    /// Account the wallet has already authorized, without prompting.
    pub async fn check_wallet_connected(&self) -> DappResult<String> {
        let session = self.connector.ensure_connected().await?;
        self.set_account(Some(&session)).await;
        Ok(session.account_string())
    }

    pub async fn connect_wallet(&self) -> DappResult<ConnectOutcome> {
        let _guard = self.begin("connect")?;
        let outcome = self.connector.connect().await?;
        self.set_account(Some(&outcome.session)).await;
        if outcome.refresh_required {
            self.contracts.invalidate().await;
            self.bump().await;
        }
        Ok(outcome)
    }

    pub async fn disconnect(&self) {
        self.connector.disconnect().await;
        self.contracts.invalidate().await;
        self.set_account(None).await;
    }

    /// Move the wallet to `name` and keep it there for later loads and actions.
    pub async fn switch_network(&self, name: &str) -> DappResult<NetworkConfig> {
        let _guard = self.begin("switch network")?;
        let network = self.connector.switch_network(name).await?;
        self.contracts.invalidate().await;
        self.set_account(None).await;
        self.bump().await;
        Ok(network)
    }

    /// Sale, token and wallet state in one display-ready snapshot.
    pub async fn load_dashboard(&self) -> DappResult<Dashboard> {
        let _guard = self.begin("load dashboard")?;
        let result = self.read_dashboard().await;
        if let Err(e) = &result {
            log::warn!("Dashboard load failed: {e}");
        }
        result
    }

    /// Native balance of `address`, or of the connected account.
    pub async fn native_balance(&self, address: Option<&str>) -> DappResult<String> {
        let session = self.session().await?;
        let signer = self.connector.signer().await?;
        let decimals = self.connector.network()?.native_currency.decimals;
        self.set_account(Some(&session)).await;
        readers::get_native_balance(&signer, address, decimals.into()).await
    }

    /// ERC-20 snapshot of `address`, the configured sale token by default.
    pub async fn token_info(&self, address: Option<&str>) -> DappResult<TokenInfo> {
        let address = address.unwrap_or(self.config.token_address.as_str()).to_string();
        let token = self.erc20(&address).await?;
        readers::get_token_info(&token.contract).await
    }

    pub async fn buy_tokens(&self, amount: u64) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_BUY_TOKEN)?;
        let result = async {
            if amount == 0 {
                return Err(DappError::validation("Token amount must be greater than zero"));
            }
            let ico = self.token_sale().await?;
            let sale = readers::get_sale_details(&ico.contract).await?;
            let value = sale
                .details
                .token_price
                .checked_mul(U256::from(amount))
                .ok_or_else(|| DappError::validation("Purchase value overflows"))?;
            log::info!("Buying {amount} tokens for {value} wei");
            self.submit(&ico.contract, FN_BUY_TOKEN, U256::from(amount), Some(value)).await
        }
        .await;
        self.finish(FN_BUY_TOKEN, result).await
    }

    pub async fn withdraw_tokens(&self) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_WITHDRAW_ALL_TOKENS)?;
        let result = async {
            let ico = self.token_sale().await?;
            self.ensure_owner(&ico, "withdraw the unsold tokens").await?;
            self.submit(&ico.contract, FN_WITHDRAW_ALL_TOKENS, (), None).await
        }
        .await;
        self.finish(FN_WITHDRAW_ALL_TOKENS, result).await
    }

    /// Point the sale at another ERC-20 token.
    pub async fn update_token(&self, token_address: &str) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_UPDATE_TOKEN)?;
        let result = async {
            let token = parse_address(token_address)?;
            let ico = self.token_sale().await?;
            self.ensure_owner(&ico, "change the sale token").await?;
            self.submit(&ico.contract, FN_UPDATE_TOKEN, token, None).await
        }
        .await;
        self.finish(FN_UPDATE_TOKEN, result).await
    }

    /// Set the per-token price, given in native currency units (e.g. `"0.001"`).
    pub async fn update_token_price(&self, price: &str) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_UPDATE_TOKEN_SALE_PRICE)?;
        let result = async {
            let price = parse_positive_amount(price, self.native_decimals()?)?;
            let ico = self.token_sale().await?;
            self.ensure_owner(&ico, "change the token price").await?;
            self.submit(&ico.contract, FN_UPDATE_TOKEN_SALE_PRICE, price, None).await
        }
        .await;
        self.finish(FN_UPDATE_TOKEN_SALE_PRICE, result).await
    }

    /// Send native currency to the sale owner through the contract.
    pub async fn donate(&self, amount: &str) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_TRANSFER_TO_OWNER)?;
        let result = async {
            let value = parse_positive_amount(amount, self.native_decimals()?)?;
            let ico = self.token_sale().await?;
            self.submit(&ico.contract, FN_TRANSFER_TO_OWNER, value, Some(value)).await
        }
        .await;
        self.finish(FN_TRANSFER_TO_OWNER, result).await
    }

    /// Send native currency to `receiver` through the contract.
    pub async fn transfer_native(&self, receiver: &str, amount: &str) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_TRANSFER_ETHER)?;
        let result = async {
            let receiver = parse_address(receiver)?;
            let value = parse_positive_amount(amount, self.native_decimals()?)?;
            let ico = self.token_sale().await?;
            self.submit(&ico.contract, FN_TRANSFER_ETHER, (receiver, value), Some(value)).await
        }
        .await;
        self.finish(FN_TRANSFER_ETHER, result).await
    }

    /// Transfer sale tokens held by the connected account.
    pub async fn transfer_token(&self, to: &str, amount: &str) -> DappResult<TransactionOutcome> {
        let _guard = self.begin(FN_TRANSFER)?;
        let result = async {
            let to = parse_address(to)?;
            let token = self.erc20(&self.config.token_address).await?;
            let decimals = readers::token_decimals(&token.contract).await?;
            let amount = parse_positive_amount(amount, decimals.into())?;
            self.submit(&token.contract, FN_TRANSFER, (to, amount), None).await
        }
        .await;
        self.finish(FN_TRANSFER, result).await
    }

    /// Offer the sale token to the wallet's asset list.
    pub async fn watch_token(&self) -> DappResult<bool> {
        let _guard = self.begin(WALLET_WATCH_ASSET)?;
        let token = self.token_info(None).await?;
        self.connector.watch_asset(&token).await
    }

    fn begin(&self, action: &str) -> DappResult<LoadingGuard> {
        let guard = LoadingGuard::acquire(&self.loading).map_err(|e| {
            log::warn!("{action} refused: another action is in progress");
            e
        })?;
        log::info!("{action} started");
        Ok(guard)
    }

    async fn finish<T>(&self, action: &str, result: DappResult<T>) -> DappResult<T> {
        match &result {
            Ok(_) => {
                log::info!("{action} completed");
                self.bump().await;
            }
            Err(e) => log::warn!("{action} failed: {e}"),
        }
        result
    }

    async fn read_dashboard(&self) -> DappResult<Dashboard> {
        let session = self.connector.ensure_connected().await?;
        self.set_account(Some(&session)).await;

        let ico = self.token_sale().await?;
        let SaleState {
            details,
            owner,
            sold_tokens,
        } = readers::get_sale_details(&ico.contract).await?;
        if let Some(expected) = self.config.configured_owner() {
            if expected != owner {
                log::warn!(
                    "Sale contract owner {} differs from configured owner {}",
                    address_to_string(&owner),
                    address_to_string(&expected)
                );
            }
        }

        let token = self.erc20(&address_to_string(&details.token_address)).await?;
        let token_decimals: u32 = readers::token_decimals(&token.contract).await?.into();

        let network = self.connector.network()?;
        let native_decimals = network.native_currency.decimals.into();
        let native_balance = readers::get_native_balance(&ico.signer, None, native_decimals).await?;

        Ok(Dashboard {
            token_bal: format_amount(details.balance, token_decimals)?,
            name: details.name,
            symbol: details.symbol,
            supply: format_amount(details.supply, token_decimals)?,
            token_price: format_amount(details.token_price, native_decimals)?,
            token_addr: address_to_string(&details.token_address),
            native_balance,
            currency: network.native_currency.symbol.clone(),
            network: self.connector.target_network(),
            chain_id: ico.session.chain_id,
            address: ico.session.account_string(),
            owner: address_to_string(&owner),
            is_owner: owner == ico.session.account,
            sold_tokens: sold_tokens.to_string(),
            loaded_at: Utc::now(),
        })
    }

    async fn session(&self) -> DappResult<WalletSession> {
        match self.connector.session().await {
            Some(session) => Ok(session),
            None => {
                let session = self.connector.ensure_connected().await?;
                self.set_account(Some(&session)).await;
                Ok(session)
            }
        }
    }

    async fn bind(&self, kind: ContractKind, address: &str) -> DappResult<Bound> {
        let session = self.session().await?;
        let signer = self.connector.signer().await?;
        let abi = match kind {
            ContractKind::TokenSale => &self.token_sale_abi,
            ContractKind::Erc20 => &self.erc20_abi,
        };
        let contract = self
            .contracts
            .get_or_create(kind, address, abi, signer.clone(), &session)
            .await?;
        Ok(Bound {
            session,
            signer,
            contract,
        })
    }

    async fn token_sale(&self) -> DappResult<Bound> {
        self.bind(ContractKind::TokenSale, &self.config.token_ico_address).await
    }

    async fn erc20(&self, address: &str) -> DappResult<Bound> {
        self.bind(ContractKind::Erc20, address).await
    }

    async fn ensure_owner(&self, ico: &Bound, action: &str) -> DappResult<()> {
        let owner: ethers::types::Address = readers::call_view(&ico.contract, FN_OWNER, ()).await?;
        if owner != ico.session.account {
            return Err(DappError::not_owner(action));
        }
        Ok(())
    }

    async fn submit<T: Tokenize>(
        &self,
        contract: &ContractHandle,
        function: &str,
        args: T,
        value: Option<U256>,
    ) -> DappResult<TransactionOutcome> {
        readers::send_transaction(contract, function, args, value, &self.config.timeouts).await
    }

    fn native_decimals(&self) -> DappResult<u32> {
        Ok(self.connector.network()?.native_currency.decimals.into())
    }

    async fn set_account(&self, session: Option<&WalletSession>) {
        self.ui.write().await.account = session.map(WalletSession::account_string);
    }

    async fn bump(&self) {
        self.ui.write().await.count += 1;
    }
}
