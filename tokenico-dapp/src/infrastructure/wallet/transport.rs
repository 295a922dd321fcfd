use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::providers::JsonRpcClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{HostError, WalletHost};
use crate::infrastructure::config::Timeouts;
use crate::shared::constants::PROMPT_METHODS;

/// Wallet host plus the timeouts every request runs under.
#[derive(Clone)]
pub struct WalletClient {
    host: Arc<dyn WalletHost>,
    timeouts: Timeouts,
}

impl Debug for WalletClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletClient").field("timeouts", &self.timeouts).finish_non_exhaustive()
    }
}

impl WalletClient {
    pub fn new(host: Arc<dyn WalletHost>, timeouts: Timeouts) -> Self {
        Self { host, timeouts }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Send one request; prompts get the long timeout, everything else the short one.
    pub async fn request_raw(&self, method: &str, params: Value) -> Result<Value, HostError> {
        let limit = if PROMPT_METHODS.contains(&method) {
            self.timeouts.prompt
        } else {
            self.timeouts.request
        };

        log::debug!("wallet request {method}");
        match tokio::time::timeout(limit, self.host.request(method, params)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("wallet request {method} timed out after {limit:?}");
                Err(HostError::timeout(method, limit))
            }
        }
    }

    pub async fn request<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, HostError> {
        let value = self.request_raw(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// ethers transport over the wallet, the Rust side of `new Web3Provider(window.ethereum)`.
#[derive(Clone, Debug)]
pub struct WalletTransport {
    client: WalletClient,
}

impl WalletTransport {
    pub fn new(client: WalletClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonRpcClient for WalletTransport {
    type Error = HostError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        // ethers sends `()` for parameterless calls; wallets expect an array
        let params = match serde_json::to_value(params)? {
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };
        self.client.request(method, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::wallet::MockWalletHost;
    use crate::shared::constants::{ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS, REQUEST_TIMEOUT_CODE};
    use ethers::providers::{Middleware, Provider};
    use serde_json::json;
    use std::time::Duration;

    struct SlowWallet {
        delay: Duration,
    }

    #[async_trait]
    impl WalletHost for SlowWallet {
        async fn request(&self, _method: &str, _params: Value) -> Result<Value, HostError> {
            tokio::time::sleep(self.delay).await;
            Ok(json!([]))
        }
    }

    fn short_timeouts() -> Timeouts {
        Timeouts {
            request: Duration::from_millis(20),
            prompt: Duration::from_millis(500),
            ..Timeouts::default()
        }
    }

    #[tokio::test]
    async fn test_read_requests_time_out() {
        let client = WalletClient::new(Arc::new(SlowWallet { delay: Duration::from_millis(200) }), short_timeouts());
        let err = client.request_raw(ETH_ACCOUNTS, json!([])).await.unwrap_err();
        assert_eq!(err.code(), Some(REQUEST_TIMEOUT_CODE));
    }

    #[tokio::test]
    async fn test_prompts_get_the_long_timeout() {
        let client = WalletClient::new(Arc::new(SlowWallet { delay: Duration::from_millis(100) }), short_timeouts());
        let accounts: Vec<String> = client.request(ETH_REQUEST_ACCOUNTS, json!([])).await.unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn test_provider_runs_over_wallet() {
        let mut host = MockWalletHost::new();
        host.expect_request()
            .withf(|method, params| method == "eth_chainId" && *params == json!([]))
            .times(1)
            .returning(|_, _| Ok(json!("0xba9304")));

        let client = WalletClient::new(Arc::new(host), Timeouts::default());
        let provider = Provider::new(WalletTransport::new(client));
        let chain_id = provider.get_chainid().await.unwrap();
        assert_eq!(chain_id.as_u64(), 12227332);
    }
}
