//! Constants for the dApp core
//!
//! Deployed addresses, wallet method names, EIP-1193 error codes and the
//! contract function names the dApp relies on.

// Application
pub const DAPP_NAME: &str = "TOKEN ICO DAPP";
pub const DEFAULT_NETWORK: &str = "neox_testnet";

// ERC20.sol deployed on NeoX T4 Testnet
pub const TOKEN_ADDRESS: &str = "0x4dC79Eab0170284d6165164f2Fd6ad432310425A";
// Account that deployed the contracts on NeoX T4 Testnet
pub const OWNER_ADDRESS: &str = "0x04381e20A2Bca7Df8D6e173D6fE1726823e956Ee";
// TokenICO.sol deployed on NeoX T4 Testnet
pub const CONTRACT_ADDRESS: &str = "0x6b31505B725e36C8580E4aB92374806FBFEe2E66";

// ABI descriptors shipped with the crate
pub const TOKEN_ICO_ABI_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/abi/TokenICO.json");
pub const ERC20_ABI_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/abi/ERC20.json");

// Wallet (EIP-1193 / EIP-3085 / EIP-3326 / EIP-747) methods
pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const WALLET_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const WALLET_ADD_CHAIN: &str = "wallet_addEthereumChain";
pub const WALLET_WATCH_ASSET: &str = "wallet_watchAsset";

/// Methods that may open a wallet prompt and wait on the user
pub const PROMPT_METHODS: &[&str] = &[
    ETH_REQUEST_ACCOUNTS,
    ETH_SEND_TRANSACTION,
    WALLET_SWITCH_CHAIN,
    WALLET_ADD_CHAIN,
    WALLET_WATCH_ASSET,
];

// EIP-1193 provider error codes
pub const USER_REJECTED_CODE: i64 = 4001;
pub const UNAUTHORIZED_CODE: i64 = 4100;
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
// JSON-RPC implementation-defined range, used for requests that never answered
pub const REQUEST_TIMEOUT_CODE: i64 = -32099;
pub const INVALID_PARAMS_CODE: i64 = -32602;

/// Selector of Solidity's `Error(string)`
pub const REVERT_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

// Token sale contract functions
pub const FN_GET_TOKEN_DETAILS: &str = "getTokenDetails";
pub const FN_OWNER: &str = "owner";
pub const FN_SOLD_TOKENS: &str = "soldTokens";
pub const FN_BUY_TOKEN: &str = "buyToken";
pub const FN_WITHDRAW_ALL_TOKENS: &str = "withdrawAllTokens";
pub const FN_UPDATE_TOKEN: &str = "updateToken";
pub const FN_UPDATE_TOKEN_SALE_PRICE: &str = "updateTokenSalePrice";
pub const FN_TRANSFER_TO_OWNER: &str = "transferToOwner";
pub const FN_TRANSFER_ETHER: &str = "transferEther";

// ERC-20 functions
pub const FN_NAME: &str = "name";
pub const FN_SYMBOL: &str = "symbol";
pub const FN_DECIMALS: &str = "decimals";
pub const FN_TOTAL_SUPPLY: &str = "totalSupply";
pub const FN_BALANCE_OF: &str = "balanceOf";
pub const FN_TRANSFER: &str = "transfer";

// Timeouts
pub const REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const PROMPT_TIMEOUT_MS: u64 = 120_000;
pub const TRANSACTION_TIMEOUT_MS: u64 = 300_000; // 5 minutes
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 2_000;

// Validation
pub const ADDRESS_LENGTH: usize = 42; // 0x + 40 hex chars

// Environment variables
pub const ENV_NETWORK: &str = "TOKENICO_NETWORK";
pub const ENV_NETWORKS_FILE: &str = "TOKENICO_NETWORKS_FILE";
pub const ENV_RPC_PREFIX: &str = "TOKENICO_RPC_";
pub const ENV_CONTRACT_ADDRESS: &str = "TOKENICO_CONTRACT_ADDRESS";
pub const ENV_TOKEN_ADDRESS: &str = "TOKENICO_TOKEN_ADDRESS";
pub const ENV_OWNER_ADDRESS: &str = "TOKENICO_OWNER_ADDRESS";
pub const ENV_ICO_ABI: &str = "TOKENICO_ICO_ABI";
pub const ENV_ERC20_ABI: &str = "TOKENICO_ERC20_ABI";
pub const ENV_WALLET_RPC_URL: &str = "TOKENICO_WALLET_RPC_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "TOKENICO_REQUEST_TIMEOUT_MS";
pub const ENV_PROMPT_TIMEOUT_MS: &str = "TOKENICO_PROMPT_TIMEOUT_MS";
pub const ENV_TX_TIMEOUT_MS: &str = "TOKENICO_TX_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "TOKENICO_POLL_INTERVAL_MS";
pub const ENV_LOG_LEVEL: &str = "TOKENICO_LOG_LEVEL";

pub const LOG_LEVEL: &str = if cfg!(debug_assertions) { "debug" } else { "info" };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployed_addresses_are_well_formed() {
        for address in [TOKEN_ADDRESS, OWNER_ADDRESS, CONTRACT_ADDRESS] {
            assert_eq!(address.len(), ADDRESS_LENGTH);
            assert!(address.starts_with("0x"));
        }
    }

    #[test]
    fn test_prompt_methods() {
        assert!(PROMPT_METHODS.contains(&ETH_REQUEST_ACCOUNTS));
        assert!(PROMPT_METHODS.contains(&ETH_SEND_TRANSACTION));
        assert!(!PROMPT_METHODS.contains(&ETH_ACCOUNTS));
        assert!(!PROMPT_METHODS.contains(&ETH_CHAIN_ID));
    }

    #[test]
    fn test_revert_selector_matches_signature() {
        assert_eq!(ethers::utils::id("Error(string)"), REVERT_SELECTOR);
    }
}
