use num_bigint::BigInt;
use typed_builder::TypedBuilder;

use super::MarketFeesConfig;

/// Config of a market.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct MarketConfig {
    /// Fees.
    #[builder(default)]
    pub fees: MarketFeesConfig,
    /// Reserve factor for longs.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub reserve_factor_long: BigInt,
    /// Reserve factor for shorts.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub reserve_factor_short: BigInt,
    /// Min collateral factor.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub min_collateral_factor: BigInt,
}

impl MarketConfig {
    /// Reserve factor of the given side.
    pub fn reserve_factor(&self, is_long: bool) -> &BigInt {
        if is_long {
            &self.reserve_factor_long
        } else {
            &self.reserve_factor_short
        }
    }
}
