//! Scripted wallet host for tests that drive ethers end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::types::{Address, H256, U256};
use serde_json::{json, Value};

use super::{HostError, WalletClient, WalletHost};
use crate::infrastructure::config::Timeouts;
use crate::shared::constants::{
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, ETH_SEND_TRANSACTION, UNSUPPORTED_METHOD_CODE,
    WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN,
};
use crate::shared::utils::address_to_string;

pub const ACCOUNT: &str = "0x04381e20a2bca7df8d6e173d6fe1726823e956ee";
pub const OTHER_ACCOUNT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

type Answer = Result<Value, (i64, String)>;

/// Answers by method name, and `eth_call` by 4-byte selector. A successful
/// switch or add moves the chain reported by `eth_chainId`.
pub struct ScriptedWallet {
    account: Address,
    responses: HashMap<String, Answer>,
    calls: HashMap<[u8; 4], Answer>,
    switched_to: Mutex<Option<Value>>,
    log: Mutex<Vec<(String, Value)>>,
}

impl ScriptedWallet {
    pub fn new(account: &str) -> Self {
        let mut responses = HashMap::new();
        responses.insert(ETH_CHAIN_ID.to_string(), Ok(json!("0xba9304")));
        responses.insert("eth_gasPrice".to_string(), Ok(json!("0x3b9aca00")));
        responses.insert("eth_estimateGas".to_string(), Ok(json!("0x5208")));

        Self {
            account: account.parse().unwrap(),
            responses,
            calls: HashMap::new(),
            switched_to: Mutex::new(None),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, method: &str, result: Value) -> Self {
        self.responses.insert(method.to_string(), Ok(result));
        self
    }

    pub fn fail(mut self, method: &str, code: i64, message: &str) -> Self {
        self.responses.insert(method.to_string(), Err((code, message.to_string())));
        self
    }

    /// Answer `eth_call` for `signature` with ABI-encoded `tokens`.
    pub fn on_call(mut self, signature: &str, tokens: Vec<Token>) -> Self {
        let encoded = format!("0x{}", hex::encode(ethers::abi::encode(&tokens)));
        self.calls.insert(ethers::utils::id(signature), Ok(json!(encoded)));
        self
    }

    pub fn fail_call(mut self, signature: &str, code: i64, message: &str) -> Self {
        self.calls.insert(ethers::utils::id(signature), Err((code, message.to_string())));
        self
    }

    /// A transaction that is accepted and mined with the given receipt status.
    pub fn mined(self, status: u64) -> Self {
        let from = address_to_string(&self.account);
        self.on(ETH_SEND_TRANSACTION, json!(TX_HASH))
            .on("eth_getTransactionReceipt", receipt(&from, status))
    }

    /// The sale contract's read surface: 1000 tokens held, price 0.001 per token.
    pub fn with_sale(self, owner: &str) -> Self {
        let token: Address = crate::shared::constants::TOKEN_ADDRESS.parse().unwrap();
        let owner: Address = owner.parse().unwrap();
        self.on_call(
            "getTokenDetails()",
            vec![
                Token::String("Theblockchaincoders".into()),
                Token::String("TBC".into()),
                Token::Uint(U256::exp10(21)),
                Token::Uint(U256::exp10(24)),
                Token::Uint(U256::exp10(15)),
                Token::Address(token),
            ],
        )
        .on_call("owner()", vec![Token::Address(owner)])
        .on_call("soldTokens()", vec![Token::Uint(U256::from(42u64))])
        .on_call("decimals()", vec![Token::Uint(U256::from(18u64))])
        .on("eth_getBalance", json!("0xde0b6b3a7640000"))
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(method, _)| method.clone()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|(m, _)| m == method).count()
    }

    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn answer_call(&self, params: &Value) -> Answer {
        let data = params[0]
            .get("data")
            .or_else(|| params[0].get("input"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let bytes = hex::decode(data.trim_start_matches("0x")).unwrap_or_default();
        if bytes.len() < 4 {
            return Err((-32000, "call without selector".to_string()));
        }

        let mut selector = [0u8; 4];
        selector.copy_from_slice(&bytes[..4]);
        self.calls
            .get(&selector)
            .cloned()
            .unwrap_or_else(|| Err((-32000, format!("no scripted answer for 0x{}", hex::encode(selector)))))
    }
}

#[async_trait]
impl WalletHost for ScriptedWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, HostError> {
        self.log.lock().unwrap().push((method.to_string(), params.clone()));

        let switched_to = self.switched_to.lock().unwrap().clone();
        let answer = match method {
            "eth_call" => self.answer_call(&params),
            ETH_CHAIN_ID if switched_to.is_some() => Ok(switched_to.unwrap_or_default()),
            _ => match self.responses.get(method) {
                Some(answer) => answer.clone(),
                None if method == ETH_ACCOUNTS || method == ETH_REQUEST_ACCOUNTS => {
                    Ok(json!([address_to_string(&self.account)]))
                }
                None => Err((UNSUPPORTED_METHOD_CODE, format!("{method} not scripted"))),
            },
        };

        if answer.is_ok() && (method == WALLET_SWITCH_CHAIN || method == WALLET_ADD_CHAIN) {
            *self.switched_to.lock().unwrap() = Some(params[0]["chainId"].clone());
        }
        answer.map_err(|(code, message)| HostError::rpc(code, message))
    }
}

fn receipt(from: &str, status: u64) -> Value {
    json!({
        "transactionHash": TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": format!("{:#x}", H256::repeat_byte(0x11)),
        "blockNumber": "0x10",
        "from": from,
        "to": crate::shared::constants::CONTRACT_ADDRESS.to_lowercase(),
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "status": format!("0x{status:x}"),
        "type": "0x0",
        "effectiveGasPrice": "0x3b9aca00"
    })
}

pub fn client(wallet: &Arc<ScriptedWallet>) -> WalletClient {
    WalletClient::new(wallet.clone(), Timeouts::default())
}

pub fn token_sale_abi() -> Abi {
    crate::core::contracts::parse_abi(include_str!("../../../abi/TokenICO.json")).unwrap()
}

pub fn erc20_abi() -> Abi {
    crate::core::contracts::parse_abi(include_str!("../../../abi/ERC20.json")).unwrap()
}
