use num_bigint::BigInt;

/// Delta of pool values.
pub mod delta;

pub use self::delta::{PoolDelta, PoolValue};

/// Pool amounts of a market.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct MarketPools {
    /// Long token amount in the pool.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub long_pool_amount: BigInt,
    /// Short token amount in the pool.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub short_pool_amount: BigInt,
    /// Long token amount in the swap impact pool.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub swap_impact_pool_amount_long: BigInt,
    /// Short token amount in the swap impact pool.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub swap_impact_pool_amount_short: BigInt,
    /// Index token amount in the position impact pool.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub position_impact_pool_amount: BigInt,
}

impl MarketPools {
    /// Pool amount of the given side.
    pub fn pool_amount(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.long_pool_amount
        } else {
            &self.short_pool_amount
        }
    }

    /// Swap impact pool amount of the given side.
    pub fn swap_impact_pool_amount(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.swap_impact_pool_amount_long
        } else {
            &self.swap_impact_pool_amount_short
        }
    }
}

/// Open interest of a market.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct OpenInterest {
    /// Long open interest in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub long_usd: BigInt,
    /// Short open interest in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub short_usd: BigInt,
    /// Long open interest in index tokens.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub long_in_tokens: BigInt,
    /// Short open interest in index tokens.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub short_in_tokens: BigInt,
}

impl OpenInterest {
    /// Open interest in USD of the given side.
    pub fn usd(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.long_usd
        } else {
            &self.short_usd
        }
    }

    /// Open interest in tokens of the given side.
    pub fn in_tokens(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.long_in_tokens
        } else {
            &self.short_in_tokens
        }
    }
}
