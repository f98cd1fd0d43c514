use num_bigint::BigInt;
use typed_builder::TypedBuilder;

use crate::utils;

use super::PriceImpactParams;

/// Seconds per hour.
const SECONDS_PER_HOUR: u32 = 3_600;

/// Fee config of a market.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct MarketFeesConfig {
    /// Position fee factor.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub position_fee_factor: BigInt,
    /// Position price impact params.
    #[builder(default)]
    pub position_impact: PriceImpactParams,
    /// Max factor of size delta that a positive position impact can reach.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub max_position_impact_factor_positive: BigInt,
    /// Max factor of size that a negative position impact can reach when
    /// estimating the liquidation price.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub max_position_impact_factor_for_liquidations: BigInt,
    /// Swap fee factor.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub swap_fee_factor: BigInt,
    /// Swap price impact params.
    #[builder(default)]
    pub swap_impact: PriceImpactParams,
    /// Borrowing factor per second for long positions.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub borrowing_factor_per_second_for_longs: BigInt,
    /// Borrowing factor per second for short positions.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub borrowing_factor_per_second_for_shorts: BigInt,
    /// Funding factor per second paid by the larger side.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub funding_factor_per_second: BigInt,
    /// Whether longs pay shorts.
    #[builder(default)]
    pub longs_pay_shorts: bool,
}

impl MarketFeesConfig {
    /// Swap fee amount charged on `amount`.
    pub fn swap_fee_amount(&self, amount: &BigInt) -> BigInt {
        utils::apply_factor(amount, &self.swap_fee_factor)
    }

    /// Position fee in USD for the given size delta.
    pub fn position_fee_usd(&self, size_delta_usd: &BigInt) -> BigInt {
        utils::apply_factor(size_delta_usd, &self.position_fee_factor)
    }

    /// Borrowing factor per second for the given side.
    pub fn borrowing_factor_per_second(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.borrowing_factor_per_second_for_longs
        } else {
            &self.borrowing_factor_per_second_for_shorts
        }
    }

    /// Borrowing rate per hour for the given side, as a factor.
    pub fn borrowing_factor_per_hour(&self, is_long: bool) -> BigInt {
        self.borrowing_factor_per_second(is_long) * SECONDS_PER_HOUR
    }

    /// Funding rate per hour for the given side, as a factor.
    ///
    /// Negative if the side is paying.
    pub fn funding_factor_per_hour(&self, is_long: bool) -> BigInt {
        let rate = &self.funding_factor_per_second * SECONDS_PER_HOUR;
        if is_long == self.longs_pay_shorts {
            -rate
        } else {
            rate
        }
    }
}
