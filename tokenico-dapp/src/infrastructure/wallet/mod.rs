//! The injected wallet seen from Rust.
//!
//! A browser wallet is an EIP-1193 `request(method, params)` endpoint.
//! [`WalletHost`] is that seam; [`WalletClient`] adds timeouts, and
//! [`WalletTransport`] lets ethers providers and contracts run over it.

pub mod http;
pub mod transport;
#[cfg(test)]
pub mod testing;

use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{JsonRpcError, Provider, ProviderError, RpcError};
use serde_json::Value;
use thiserror::Error;

use crate::shared::constants::REQUEST_TIMEOUT_CODE;

pub use http::HttpWallet;
pub use transport::{WalletClient, WalletTransport};

/// Provider whose default sender is the connected account; the wallet signs.
pub type WalletSigner = Provider<WalletTransport>;

/// Failure reported by a wallet host
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Rpc(JsonRpcError),

    #[error("wallet transport failure: {0}")]
    Transport(String),

    #[error("malformed wallet payload: {0}")]
    Serde(#[from] serde_json::Error),
}

impl HostError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc(JsonRpcError {
            code,
            message: message.into(),
            data: None,
        })
    }

    /// A request the wallet never answered.
    pub fn timeout(method: &str, after: Duration) -> Self {
        Self::rpc(REQUEST_TIMEOUT_CODE, format!("{method} timed out after {after:?}"))
    }

    pub fn code(&self) -> Option<i64> {
        self.as_error_response().map(|response| response.code)
    }
}

impl RpcError for HostError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            HostError::Rpc(response) => Some(response),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            HostError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HostError> for ProviderError {
    fn from(src: HostError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}

/// EIP-1193 request surface of an injected wallet.
///
/// Holding no host at all is the "no wallet installed" condition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletHost: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, HostError>;
}
