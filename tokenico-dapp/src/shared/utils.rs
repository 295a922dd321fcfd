//! Utility functions for the dApp core
//!
//! Address validation, chain id encoding and base-unit formatting.

use ethers::types::{Address, U256};
use ethers::utils::{format_units, parse_units};

use crate::shared::constants::ADDRESS_LENGTH;
use crate::shared::error::DappError;

/// Validate Ethereum address format
pub fn validate_ethereum_address(address: &str) -> Result<(), DappError> {
    if !address.starts_with("0x") {
        return Err(DappError::invalid_address(format!("{address}: must start with 0x")));
    }

    if address.len() != ADDRESS_LENGTH {
        return Err(DappError::invalid_address(format!(
            "{address}: must be {ADDRESS_LENGTH} characters long"
        )));
    }

    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DappError::invalid_address(format!("{address}: contains invalid hex characters")));
    }

    Ok(())
}

/// Parse a `0x`-prefixed address into its typed form.
pub fn parse_address(address: &str) -> Result<Address, DappError> {
    validate_ethereum_address(address)?;
    address
        .parse::<Address>()
        .map_err(|e| DappError::invalid_address(format!("{address}: {e}")))
}

/// Lower-case `0x` form used for display and comparisons.
pub fn address_to_string(address: &Address) -> String {
    format!("{address:#x}")
}

/// Encode a chain id the way wallets expect it, e.g. `12227332` -> `"0xba9304"`.
pub fn chain_id_to_hex(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

/// Decode a chain id given either as `0x` hex or as a decimal string.
pub fn parse_chain_id(value: &str) -> Result<u64, DappError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| DappError::validation(format!("Invalid chain id: {value}")))
}

/// Convert base units to a display decimal, e.g. `10^18` with 18 decimals -> `"1.0"`.
///
/// Trailing zeros of the fraction are dropped but at least one fractional
/// digit is kept, matching what wallets and explorers show.
pub fn format_amount(amount: U256, decimals: u32) -> Result<String, DappError> {
    let full = format_units(amount, decimals)
        .map_err(|e| DappError::validation(format!("Cannot format amount with {decimals} decimals: {e}")))?;

    let (integer, fraction) = full.split_once('.').unwrap_or((full.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    Ok(format!("{integer}.{fraction}"))
}

/// Convert a user-entered decimal to base units.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<U256, DappError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(DappError::validation("Amount cannot be empty"));
    }
    if amount.starts_with('-') {
        return Err(DappError::validation("Amount cannot be negative"));
    }

    let parsed = parse_units(amount, decimals)
        .map_err(|e| DappError::validation(format!("Invalid amount {amount}: {e}")))?;
    Ok(parsed.into())
}

/// Like [`parse_amount`] but rejects zero.
pub fn parse_positive_amount(amount: &str, decimals: u32) -> Result<U256, DappError> {
    let value = parse_amount(amount, decimals)?;
    if value.is_zero() {
        return Err(DappError::validation("Amount must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ethereum_address() {
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6").is_ok());
        assert!(validate_ethereum_address("0x0000000000000000000000000000000000000000").is_ok());

        // Too short
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b").is_err());
        // Invalid character
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8bG").is_err());
        // Missing prefix
        assert!(validate_ethereum_address("742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6ab").is_err());
    }

    #[test]
    fn test_parse_address_lowercases_for_display() {
        let address = parse_address("0x4dC79Eab0170284d6165164f2Fd6ad432310425A").unwrap();
        assert_eq!(address_to_string(&address), "0x4dc79eab0170284d6165164f2fd6ad432310425a");
        assert!(matches!(parse_address("0x1234"), Err(DappError::InvalidAddress(_))));
    }

    #[test]
    fn test_chain_id_encoding() {
        assert_eq!(chain_id_to_hex(12227332), "0xba9304");
        assert_eq!(chain_id_to_hex(31337), "0x7a69");
        assert_eq!(parse_chain_id("0xba9304").unwrap(), 12227332);
        assert_eq!(parse_chain_id("84532").unwrap(), 84532);
        assert!(parse_chain_id("0xzz").is_err());
    }

    #[test]
    fn test_format_amount() {
        let one_ether = U256::exp10(18);
        assert_eq!(format_amount(one_ether, 18).unwrap(), "1.0");
        assert_eq!(format_amount(U256::from(1_500_000u64), 6).unwrap(), "1.5");
        assert_eq!(format_amount(U256::zero(), 18).unwrap(), "0.0");
        assert_eq!(format_amount(U256::from(1u64), 18).unwrap(), "0.000000000000000001");
        assert_eq!(format_amount(U256::from(42u64), 0).unwrap(), "42.0");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5", 18).unwrap(), U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(parse_amount("2", 6).unwrap(), U256::from(2_000_000u64));
        assert!(parse_amount("-1", 18).is_err());
        assert!(parse_amount("", 18).is_err());
        assert!(parse_amount("abc", 18).is_err());
        assert!(parse_positive_amount("0", 18).is_err());
    }
}
