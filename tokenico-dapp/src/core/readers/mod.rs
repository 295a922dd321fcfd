//! Balance and token readers, plus the transaction path shared by every action.
//!
//! Readers either return complete data or a `RemoteCallFailed` naming the
//! call that broke; nothing is defaulted.

use ethers::abi::{Detokenize, Tokenize};
use ethers::providers::Middleware;
use ethers::types::{Address, H256, U256, U64};

use crate::core::contracts::ContractHandle;
use crate::domain::{SaleDetails, SaleState, TokenInfo};
use crate::infrastructure::config::Timeouts;
use crate::infrastructure::wallet::WalletSigner;
use crate::shared::constants::*;
use crate::shared::error::DappError;
use crate::shared::types::{DappResult, TransactionOutcome};
use crate::shared::utils::{address_to_string, format_amount, parse_address};

/// Call a view function and decode its return value.
pub async fn call_view<T, D>(contract: &ContractHandle, function: &str, args: T) -> DappResult<D>
where
    T: Tokenize,
    D: Detokenize,
{
    let call = contract
        .method::<T, D>(function, args)
        .map_err(|e| DappError::invalid_abi(format!("{function}: {e}")))?;

    call.call().await.map_err(|e| {
        let err = DappError::from_contract(function, e);
        log::warn!("{function} on {:#x} failed: {err}", contract.address());
        err
    })
}

/// Native balance of `address`, or of the connected account when `None`.
pub async fn get_native_balance(signer: &WalletSigner, address: Option<&str>, decimals: u32) -> DappResult<String> {
    let owner = match address {
        Some(address) => parse_address(address)?,
        None => connected_account(signer)?,
    };

    let balance = signer
        .get_balance(owner, None)
        .await
        .map_err(|e| DappError::from_provider("getBalance", e))?;
    format_amount(balance, decimals)
}

/// ERC-20 metadata and the connected account's balance, scaled by the token's decimals.
pub async fn get_token_info(token: &ContractHandle) -> DappResult<TokenInfo> {
    let holder = connected_account(token.client_ref())?;

    let name: String = call_view(token, FN_NAME, ()).await?;
    let symbol: String = call_view(token, FN_SYMBOL, ()).await?;
    let decimals = token_decimals(token).await?;
    let supply: U256 = call_view(token, FN_TOTAL_SUPPLY, ()).await?;
    let balance: U256 = call_view(token, FN_BALANCE_OF, holder).await?;
    let chain_id = token
        .client_ref()
        .get_chainid()
        .await
        .map_err(|e| DappError::from_provider(ETH_CHAIN_ID, e))?;

    Ok(TokenInfo {
        address: address_to_string(&token.address()),
        name,
        symbol,
        decimals,
        supply: format_amount(supply, decimals.into())?,
        balance: format_amount(balance, decimals.into())?,
        chain_id: chain_id.as_u64(),
    })
}

pub async fn token_decimals(token: &ContractHandle) -> DappResult<u8> {
    call_view(token, FN_DECIMALS, ()).await
}

/// `getTokenDetails`, `owner` and `soldTokens` of the sale contract.
pub async fn get_sale_details(ico: &ContractHandle) -> DappResult<SaleState> {
    let raw: (String, String, U256, U256, U256, Address) = call_view(ico, FN_GET_TOKEN_DETAILS, ()).await?;
    let owner: Address = call_view(ico, FN_OWNER, ()).await?;
    let sold_tokens: U256 = call_view(ico, FN_SOLD_TOKENS, ()).await?;

    Ok(SaleState {
        details: SaleDetails::from(raw),
        owner,
        sold_tokens,
    })
}

/// Submit a state-changing call through the wallet and wait until it is mined.
pub async fn send_transaction<T: Tokenize>(
    contract: &ContractHandle,
    function: &str,
    args: T,
    value: Option<U256>,
    timeouts: &Timeouts,
) -> DappResult<TransactionOutcome> {
    let mut call = contract
        .method::<T, ()>(function, args)
        .map_err(|e| DappError::invalid_abi(format!("{function}: {e}")))?
        .legacy();
    if let Some(value) = value {
        call = call.value(value);
    }

    let hash = {
        let pending = call.send().await.map_err(|e| {
            let err = DappError::from_contract(function, e);
            log::warn!("{function} was not submitted: {err}");
            err
        })?;
        *pending
    };
    log::info!("{function} submitted as {hash:#x}");

    wait_for_receipt(contract.client_ref(), function, hash, timeouts).await
}

/// Poll for the receipt until it appears or `timeouts.transaction` runs out.
pub async fn wait_for_receipt(
    signer: &WalletSigner,
    operation: &str,
    hash: H256,
    timeouts: &Timeouts,
) -> DappResult<TransactionOutcome> {
    let poll = async {
        loop {
            let receipt = signer
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| DappError::from_provider("getTransactionReceipt", e))?;
            match receipt {
                Some(receipt) => return Ok::<_, DappError>(receipt),
                None => tokio::time::sleep(timeouts.poll_interval).await,
            }
        }
    };

    let receipt = tokio::time::timeout(timeouts.transaction, poll)
        .await
        .map_err(|_| DappError::timeout(operation, timeouts.transaction))??;

    if receipt.status == Some(U64::zero()) {
        log::warn!("{operation} reverted in {hash:#x}");
        return Err(DappError::TransactionReverted(format!("{operation} in {hash:#x}")));
    }

    log::info!("{operation} mined in block {:?}", receipt.block_number);
    Ok(TransactionOutcome {
        hash: format!("{hash:#x}"),
        block_number: receipt.block_number.map(|block| block.as_u64()),
        gas_used: receipt.gas_used.map(|gas| gas.to_string()),
    })
}

fn connected_account(signer: &WalletSigner) -> DappResult<Address> {
    signer
        .default_sender()
        .ok_or_else(|| DappError::not_authorized("no connected account"))
}
