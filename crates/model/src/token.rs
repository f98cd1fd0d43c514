use std::{fmt, str::FromStr};

use num_bigint::BigInt;

use crate::{price::Price, utils};

/// Address of a token or a market token.
///
/// Always stored as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
pub struct Address(String);

impl Address {
    /// Get the address as str.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| crate::Error::InvalidAddress(s.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(crate::Error::InvalidAddress(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Token {
    /// Address.
    pub address: Address,
    /// Symbol.
    pub symbol: String,
    /// Decimals.
    pub decimals: u8,
    /// Whether the token is a stable coin.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_stable: bool,
    /// Whether the token is the native token of the chain.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_native: bool,
    /// Whether the token is the wrapped native token.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_wrapped: bool,
    /// Latest prices, `None` if not loaded yet.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prices: Option<Price>,
}

impl Token {
    /// Create a token without prices.
    pub fn new(address: Address, symbol: impl ToString, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
            is_stable: false,
            is_native: false,
            is_wrapped: false,
            prices: None,
        }
    }

    /// Set prices.
    pub fn with_prices(mut self, prices: Price) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Mark as a stable token.
    pub fn stable(mut self) -> Self {
        self.is_stable = true;
        self
    }

    /// Get prices.
    pub fn prices(&self) -> Option<&Price> {
        self.prices.as_ref()
    }

    /// Convert an amount of this token to USD value with the given price.
    pub fn to_usd(&self, amount: &BigInt, price: &BigInt) -> BigInt {
        utils::convert_to_usd(amount, self.decimals, price)
    }

    /// Convert a USD value to an amount of this token with the given price.
    pub fn to_amount(&self, usd: &BigInt, price: &BigInt) -> Option<BigInt> {
        utils::convert_to_token_amount(usd, self.decimals, price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address() {
        let address: Address = "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1".parse().unwrap();
        assert_eq!(
            address.as_str(),
            "0x82af49447d8a07e3bd95bd0d56f35241523fbab1"
        );
        assert!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"
            .parse::<Address>()
            .is_err());
        assert!("0x1234".parse::<Address>().is_err());
    }
}
