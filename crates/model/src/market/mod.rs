use crate::{
    params::MarketConfig,
    pool::{MarketPools, OpenInterest},
    token::Address,
};

/// Liquidity of markets.
pub mod liquidity;

/// Market, a pool trading one index token against a pair of collateral tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Market {
    /// Market token address, the identity of the market.
    #[cfg_attr(feature = "serde", serde(rename = "marketTokenAddress"))]
    pub market_token: Address,
    /// Index token address.
    #[cfg_attr(feature = "serde", serde(rename = "indexTokenAddress"))]
    pub index_token: Address,
    /// Long token address.
    #[cfg_attr(feature = "serde", serde(rename = "longTokenAddress"))]
    pub long_token: Address,
    /// Short token address.
    #[cfg_attr(feature = "serde", serde(rename = "shortTokenAddress"))]
    pub short_token: Address,
    /// Whether the market only supports swaps.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_spot_only: bool,
}

impl Market {
    /// Create a new market.
    pub fn new(
        market_token: Address,
        index_token: Address,
        long_token: Address,
        short_token: Address,
    ) -> Self {
        Self {
            market_token,
            index_token,
            long_token,
            short_token,
            is_spot_only: false,
        }
    }

    /// Returns whether the long token and the short token are the same.
    pub fn is_single_token(&self) -> bool {
        self.long_token == self.short_token
    }

    /// Returns whether the given token is one of the collateral tokens.
    pub fn is_collateral_token(&self, token: &Address) -> bool {
        self.long_token == *token || self.short_token == *token
    }

    /// Returns `Some(true)` if the token is the long token, `Some(false)` if it is the short token.
    pub fn collateral_side(&self, token: &Address) -> Option<bool> {
        if self.long_token == *token {
            Some(true)
        } else if self.short_token == *token {
            Some(false)
        } else {
            None
        }
    }

    /// Get the collateral token of the given side.
    pub fn collateral_token(&self, is_long: bool) -> &Address {
        if is_long {
            &self.long_token
        } else {
            &self.short_token
        }
    }

    /// Get the opposite collateral token of the given token.
    pub fn opposite_token(&self, token: &Address) -> Option<&Address> {
        let is_long = self.collateral_side(token)?;
        Some(self.collateral_token(!is_long))
    }
}

/// A market together with its latest state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MarketInfo {
    /// Market.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub market: Market,
    /// Pools.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pools: MarketPools,
    /// Open interest.
    #[cfg_attr(feature = "serde", serde(default))]
    pub open_interest: OpenInterest,
    /// Config.
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: MarketConfig,
}

impl MarketInfo {
    /// Create a new [`MarketInfo`] with empty state.
    pub fn new(market: Market) -> Self {
        Self {
            market,
            pools: Default::default(),
            open_interest: Default::default(),
            config: Default::default(),
        }
    }

    /// Set pools.
    pub fn with_pools(mut self, pools: MarketPools) -> Self {
        self.pools = pools;
        self
    }

    /// Set open interest.
    pub fn with_open_interest(mut self, open_interest: OpenInterest) -> Self {
        self.open_interest = open_interest;
        self
    }

    /// Set config.
    pub fn with_config(mut self, config: MarketConfig) -> Self {
        self.config = config;
        self
    }

    /// Market token address.
    pub fn address(&self) -> &Address {
        &self.market.market_token
    }
}
