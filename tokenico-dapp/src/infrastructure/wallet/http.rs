//! Wallet host backed by a node that holds unlocked accounts (anvil, hardhat, geth --dev).
//!
//! Used by the command-line tools, where there is no browser wallet to inject.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{HostError, WalletHost};
use crate::shared::constants::{
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, INVALID_PARAMS_CODE, UNRECOGNIZED_CHAIN_CODE,
    WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN, WALLET_WATCH_ASSET,
};
use crate::shared::utils::parse_chain_id;

#[derive(Debug)]
pub struct HttpWallet {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpWallet {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn forward(&self, method: &str, params: Value) -> Result<Value, HostError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = build_request_body(id, method, params);

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HostError::Transport(format!("{method}: {e}")))?;
        let resp_json: Value = resp
            .json()
            .await
            .map_err(|e| HostError::Transport(format!("invalid response to {method}: {e}")))?;

        parse_response(resp_json)
    }

    /// A node cannot change chains; succeed only if it is already on the requested one.
    async fn switch_chain(&self, params: &Value) -> Result<Value, HostError> {
        let requested = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .and_then(Value::as_str)
            .ok_or_else(|| HostError::rpc(INVALID_PARAMS_CODE, "missing chainId"))?;
        let requested = parse_chain_id(requested).map_err(|e| HostError::rpc(INVALID_PARAMS_CODE, e.to_string()))?;

        let current = self.forward(ETH_CHAIN_ID, json!([])).await?;
        let current = current
            .as_str()
            .and_then(|c| parse_chain_id(c).ok())
            .ok_or_else(|| HostError::Transport(format!("node returned malformed chain id: {current}")))?;

        if current == requested {
            Ok(Value::Null)
        } else {
            Err(HostError::rpc(
                UNRECOGNIZED_CHAIN_CODE,
                format!("node at {} serves chain {current}, not {requested}", self.url),
            ))
        }
    }
}

#[async_trait]
impl WalletHost for HttpWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, HostError> {
        match method {
            // unlocked node accounts are always authorized
            ETH_REQUEST_ACCOUNTS => self.forward(ETH_ACCOUNTS, params).await,
            WALLET_SWITCH_CHAIN | WALLET_ADD_CHAIN => self.switch_chain(&params).await,
            WALLET_WATCH_ASSET => Ok(Value::Bool(false)),
            _ => self.forward(method, params).await,
        }
    }
}

pub fn build_request_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    })
}

/// Pull `result` out of a JSON-RPC response, or turn `error` into [`HostError::Rpc`].
pub fn parse_response(resp_json: Value) -> Result<Value, HostError> {
    if let Some(error) = resp_json.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(HostError::rpc(code, message));
    }

    resp_json
        .get("result")
        .cloned()
        .ok_or_else(|| HostError::Transport("response carries neither result nor error".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = build_request_body(7, "eth_chainId", json!([]));
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "eth_chainId");
        assert_eq!(body["id"], 7);
        assert_eq!(body["params"], json!([]));
    }

    #[test]
    fn test_parse_result() {
        let result = parse_response(json!({"jsonrpc": "2.0", "id": 1, "result": "0x7a69"})).unwrap();
        assert_eq!(result, json!("0x7a69"));

        // null is a legitimate result, e.g. a pending receipt
        let pending = parse_response(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert!(pending.is_null());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "insufficient funds for gas"}
        }))
        .unwrap_err();
        assert_eq!(err.code(), Some(-32000));
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_response(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        assert!(matches!(err, HostError::Transport(_)));
    }

    #[tokio::test]
    async fn test_watch_asset_is_declined_without_network() {
        let wallet = HttpWallet::new("http://127.0.0.1:1");
        let added = wallet.request(WALLET_WATCH_ASSET, json!({})).await.unwrap();
        assert_eq!(added, Value::Bool(false));
    }

    #[tokio::test]
    async fn test_switch_rejects_missing_chain_id() {
        let wallet = HttpWallet::new("http://127.0.0.1:1");
        let err = wallet.request(WALLET_SWITCH_CHAIN, json!([{}])).await.unwrap_err();
        assert_eq!(err.code(), Some(INVALID_PARAMS_CODE));
    }
}
