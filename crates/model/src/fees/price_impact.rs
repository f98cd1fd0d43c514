use num_bigint::BigInt;
use num_traits::Signed;

use crate::{
    num::{checked_round_up_magnitude_div, SignedExt},
    params::PriceImpactParams,
    pool::{PoolDelta, PoolValue},
    price::PriceKind,
    snapshot::MarketsSnapshot,
    token::Address,
    utils, MarketInfo,
};

use super::PriceImpact;

/// Compute the price impact of moving a pool from `current` by the given deltas.
///
/// Returns `None` if both deltas are zero or the impact cannot be computed.
pub fn price_impact_usd(
    current: PoolValue,
    long_delta_usd: BigInt,
    short_delta_usd: BigInt,
    params: &PriceImpactParams,
) -> Option<PriceImpact> {
    let delta = PoolDelta::new(current, long_delta_usd, short_delta_usd);
    if delta.is_empty() {
        return None;
    }
    let impact_delta_usd = delta.price_impact(params).ok()?;
    let basis_points = utils::basis_points(&impact_delta_usd.abs(), &delta.trade_size());
    Some(PriceImpact {
        impact_delta_usd,
        basis_points,
    })
}

impl MarketsSnapshot {
    /// Price impact of a swap through the given market.
    ///
    /// Deltas are token amounts, valued at mid prices against the pools
    /// valued at mid prices.
    pub fn price_impact_for_swap(
        &self,
        info: &MarketInfo,
        token_in: &Address,
        token_in_delta_amount: &BigInt,
        token_out_delta_amount: &BigInt,
    ) -> Option<PriceImpact> {
        let market = &info.market;
        let is_long_in = market.collateral_side(token_in)?;
        let long_token = self.token(&market.long_token)?;
        let short_token = self.token(&market.short_token)?;
        let long_price = long_token.prices()?.mid();
        let short_price = short_token.prices()?.mid();

        let long_pool_usd = self.pool_usd(info, true, PriceKind::Mid)?;
        let short_pool_usd = self.pool_usd(info, false, PriceKind::Mid)?;

        let (long_delta_amount, short_delta_amount) = if is_long_in {
            (token_in_delta_amount, token_out_delta_amount)
        } else {
            (token_out_delta_amount, token_in_delta_amount)
        };

        price_impact_usd(
            PoolValue::new(long_pool_usd, short_pool_usd),
            long_token.to_usd(long_delta_amount, &long_price),
            short_token.to_usd(short_delta_amount, &short_price),
            &info.config.fees.swap_impact,
        )
    }

    /// Price impact of changing the size of a position by `size_delta_usd`.
    ///
    /// Returns `None` if a decrease would drive the open interest negative.
    pub fn price_impact_for_position(
        &self,
        info: &MarketInfo,
        size_delta_usd: &BigInt,
        is_long: bool,
    ) -> Option<PriceImpact> {
        let open_interest = &info.open_interest;
        if size_delta_usd.is_negative()
            && (open_interest.usd(is_long) + size_delta_usd).is_negative()
        {
            return None;
        }
        let zero = BigInt::default();
        let (long_delta_usd, short_delta_usd) = if is_long {
            (size_delta_usd.clone(), zero)
        } else {
            (zero, size_delta_usd.clone())
        };
        price_impact_usd(
            PoolValue::new(open_interest.long_usd.clone(), open_interest.short_usd.clone()),
            long_delta_usd,
            short_delta_usd,
            &info.config.fees.position_impact,
        )
    }

    /// Convert a swap price impact into an amount of `token`.
    ///
    /// - Positive impact is valued at the max price, rounded down and capped by
    ///   the swap impact pool of `token`.
    /// - Negative impact is valued at the min price and rounded up. It is never capped.
    pub fn apply_swap_impact_with_cap(
        &self,
        info: &MarketInfo,
        token: &Address,
        impact: &PriceImpact,
    ) -> Option<BigInt> {
        let token_data = self.token(token)?;
        let is_positive = impact.impact_delta_usd.is_positive();
        let price = utils::convert_to_contract_price(
            token_data.prices()?.pick(is_positive),
            token_data.decimals,
        );
        if !price.is_positive() {
            return None;
        }
        if is_positive {
            let is_long = info.market.collateral_side(token)?;
            let max_amount = info.pools.swap_impact_pool_amount(is_long).clone();
            Some((&impact.impact_delta_usd / &price).min_of(max_amount))
        } else {
            checked_round_up_magnitude_div(&impact.impact_delta_usd, &price)
        }
    }

    /// Cap a positive position price impact by the position impact pool and
    /// by the max positive impact factor of the size delta.
    ///
    /// Negative impact is returned as is.
    pub fn capped_position_impact_usd(
        &self,
        info: &MarketInfo,
        impact: &PriceImpact,
        size_delta_usd: &BigInt,
    ) -> Option<BigInt> {
        if impact.impact_delta_usd.is_negative() {
            return Some(impact.impact_delta_usd.clone());
        }
        let index_token = self.token(&info.market.index_token)?;
        let max_by_pool = index_token.to_usd(
            &info.pools.position_impact_pool_amount,
            &index_token.prices()?.min,
        );
        let max_by_factor = utils::apply_factor(
            &size_delta_usd.abs(),
            &info.config.fees.max_position_impact_factor_positive,
        );
        Some(
            impact
                .impact_delta_usd
                .clone()
                .min_of(max_by_pool)
                .min_of(max_by_factor),
        )
    }
}
