//! Error handling for the dApp core
//!
//! Every failure reaches the UI layer as a typed `DappError` so it can tell
//! "not connected" apart from "transient RPC failure" and "user declined".

use std::time::Duration;

use ethers::abi::ParamType;
use ethers::contract::ContractError;
use ethers::providers::{ProviderError, RpcError};
use ethers::types::Bytes;
use thiserror::Error;

use crate::infrastructure::wallet::{HostError, WalletSigner};
use crate::shared::constants::{
    REQUEST_TIMEOUT_CODE, REVERT_SELECTOR, UNAUTHORIZED_CODE, USER_REJECTED_CODE,
};

/// dApp error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DappError {
    #[error("No crypto wallet found")]
    NoWalletFound,

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    #[error("Wallet has not authorized this dApp: {0}")]
    NotAuthorized(String),

    #[error("ABI load error: {0}")]
    AbiLoad(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    #[error("Remote call `{operation}` failed: {message}")]
    RemoteCallFailed {
        operation: String,
        message: String,
        code: Option<i64>,
        timed_out: bool,
    },

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Only the contract owner may {0}")]
    NotOwner(String),

    #[error("Another action is already in progress")]
    Busy,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DappError {
    /// Create an unknown network error
    pub fn unknown_network(name: impl Into<String>) -> Self {
        Self::UnknownNetwork(name.into())
    }

    /// Create a user rejection error
    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::UserRejected(message.into())
    }

    /// Create a not-authorized error
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::NotAuthorized(message.into())
    }

    /// Create an ABI load error
    pub fn abi_load(message: impl Into<String>) -> Self {
        Self::AbiLoad(message.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress(message.into())
    }

    /// Create an invalid ABI error
    pub fn invalid_abi(message: impl Into<String>) -> Self {
        Self::InvalidAbi(message.into())
    }

    /// Create a remote call failure without a JSON-RPC code
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteCallFailed {
            operation: operation.into(),
            message: message.into(),
            code: None,
            timed_out: false,
        }
    }

    /// Create a remote call failure for a request that never answered
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::RemoteCallFailed {
            operation: operation.into(),
            message: format!("timed out after {after:?}"),
            code: Some(REQUEST_TIMEOUT_CODE),
            timed_out: true,
        }
    }

    /// Create a not-owner error
    pub fn not_owner(action: impl Into<String>) -> Self {
        Self::NotOwner(action.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classify a JSON-RPC error returned by the wallet or the node behind it.
    pub fn from_rpc(operation: &str, code: i64, message: &str) -> Self {
        match code {
            USER_REJECTED_CODE => Self::user_rejected(message),
            UNAUTHORIZED_CODE => Self::not_authorized(message),
            _ => Self::RemoteCallFailed {
                operation: operation.to_string(),
                message: message.to_string(),
                code: Some(code),
                timed_out: code == REQUEST_TIMEOUT_CODE,
            },
        }
    }

    /// Convert a failure reported by the wallet host.
    pub fn from_host(operation: &str, err: HostError) -> Self {
        match err.as_error_response() {
            Some(response) => Self::from_rpc(operation, response.code, &response.message),
            None => Self::remote(operation, err.to_string()),
        }
    }

    /// Convert a provider failure, keeping the JSON-RPC code when there is one.
    pub fn from_provider(operation: &str, err: ProviderError) -> Self {
        match err.as_error_response() {
            Some(response) => Self::from_rpc(operation, response.code, &response.message),
            None => Self::remote(operation, err.to_string()),
        }
    }

    /// Convert a contract call failure.
    pub fn from_contract(operation: &str, err: ContractError<WalletSigner>) -> Self {
        match err {
            ContractError::MiddlewareError { e } | ContractError::ProviderError { e } => {
                Self::from_provider(operation, e)
            }
            ContractError::Revert(data) => Self::remote(
                operation,
                format!("execution reverted: {}", revert_reason(&data)),
            ),
            ContractError::AbiError(e) => Self::invalid_abi(format!("{operation}: {e}")),
            other => Self::remote(operation, other.to_string()),
        }
    }

    /// JSON-RPC code carried by the error, if any
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::UserRejected(_) => Some(USER_REJECTED_CODE),
            Self::NotAuthorized(_) => Some(UNAUTHORIZED_CODE),
            Self::RemoteCallFailed { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RemoteCallFailed { timed_out: true, .. })
    }
}

/// Decode a Solidity `Error(string)` payload, falling back to raw hex.
fn revert_reason(data: &Bytes) -> String {
    if data.len() >= 4 && data[..4] == REVERT_SELECTOR {
        if let Ok(tokens) = ethers::abi::decode(&[ParamType::String], &data[4..]) {
            if let Some(reason) = tokens.into_iter().next().and_then(|t| t.into_string()) {
                return reason;
            }
        }
    }
    format!("0x{}", hex::encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::Token;

    #[test]
    fn test_dapp_error_creation() {
        let config_error = DappError::config("Invalid configuration");
        let address_error = DappError::invalid_address("0x12");
        let validation_error = DappError::validation("Invalid input");

        assert!(matches!(config_error, DappError::Config(_)));
        assert!(matches!(address_error, DappError::InvalidAddress(_)));
        assert!(matches!(validation_error, DappError::Validation(_)));
    }

    #[test]
    fn test_rpc_codes_are_classified() {
        let rejected = DappError::from_rpc("eth_requestAccounts", 4001, "User rejected the request.");
        assert_eq!(rejected, DappError::user_rejected("User rejected the request."));

        let unauthorized = DappError::from_rpc("eth_sendTransaction", 4100, "Unauthorized");
        assert!(matches!(unauthorized, DappError::NotAuthorized(_)));

        let node = DappError::from_rpc("eth_call", -32000, "header not found");
        assert_eq!(node.code(), Some(-32000));
        assert!(!node.is_timeout());
    }

    #[test]
    fn test_host_timeout_keeps_timeout_flag() {
        let err = DappError::from_host(
            "eth_accounts",
            HostError::timeout("eth_accounts", Duration::from_millis(50)),
        );
        assert!(err.is_timeout());
        assert!(err.to_string().contains("eth_accounts"));
    }

    #[test]
    fn test_transport_failure_has_no_code() {
        let err = DappError::from_host("eth_chainId", HostError::Transport("connection refused".into()));
        assert_eq!(err.code(), None);
        assert!(matches!(err, DappError::RemoteCallFailed { timed_out: false, .. }));
    }

    #[test]
    fn test_revert_reason_decoding() {
        let mut payload = REVERT_SELECTOR.to_vec();
        payload.extend(ethers::abi::encode(&[Token::String("Only owner".into())]));
        assert_eq!(revert_reason(&Bytes::from(payload)), "Only owner");
        assert_eq!(revert_reason(&Bytes::from(vec![0xde, 0xad])), "0xdead");
    }

    #[test]
    fn test_error_display() {
        let error = DappError::remote("soldTokens", "node unavailable");
        let display = format!("{}", error);

        assert!(display.contains("soldTokens"));
        assert!(display.contains("node unavailable"));
    }
}
