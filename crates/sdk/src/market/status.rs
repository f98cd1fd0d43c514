use synthetics_model::BigInt;

use super::Value;

/// Market Status.
#[serde_with::serde_as]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    /// Funding fee rate per hour for long, negative if longs pay.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub funding_rate_per_hour_for_long: BigInt,
    /// Funding fee rate per hour for short, negative if shorts pay.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub funding_rate_per_hour_for_short: BigInt,
    /// Borrowing fee rate per hour for long.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub borrowing_rate_per_hour_for_long: BigInt,
    /// Borrowing fee rate per hour for short.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub borrowing_rate_per_hour_for_short: BigInt,
    /// Pending pnl of traders for long.
    pub pending_pnl_for_long: Value,
    /// Pending pnl of traders for short.
    pub pending_pnl_for_short: Value,
    /// Reserved value for long.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub reserved_value_for_long: BigInt,
    /// Reserved value for short.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub reserved_value_for_short: BigInt,
    /// Max reserved value for long.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_reserved_value_for_long: BigInt,
    /// Max reserved value for short.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_reserved_value_for_short: BigInt,
    /// Pool value of the long token.
    pub pool_value_for_long: Value,
    /// Pool value of the short token.
    pub pool_value_for_short: Value,
    /// Liquidity for opening long positions.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub liquidity_for_long: BigInt,
    /// Liquidity for opening short positions.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub liquidity_for_short: BigInt,
    /// Open interest for long.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub open_interest_for_long: BigInt,
    /// Open interest for short.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub open_interest_for_short: BigInt,
    /// Open interest in tokens for long.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub open_interest_in_tokens_for_long: BigInt,
    /// Open interest in tokens for short.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub open_interest_in_tokens_for_short: BigInt,
}

impl MarketStatus {
    /// Liquidity for opening positions of the given side.
    pub fn liquidity(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.liquidity_for_long
        } else {
            &self.liquidity_for_short
        }
    }
}
