use num_bigint::BigInt;
use num_traits::Zero;

use crate::{price::PriceKind, snapshot::MarketsSnapshot, utils, MarketInfo};

impl MarketsSnapshot {
    /// USD value of the pool of the given side.
    ///
    /// Returns `None` if the collateral token or its prices are missing.
    pub fn pool_usd(&self, info: &MarketInfo, is_long: bool, kind: PriceKind) -> Option<BigInt> {
        let token = self.token(info.market.collateral_token(is_long))?;
        let price = kind.of(token.prices()?);
        Some(token.to_usd(info.pools.pool_amount(is_long), &price))
    }

    /// USD value reserved by the open positions of the given side.
    ///
    /// Longs are valued in index tokens at the max price.
    pub fn reserved_usd(&self, info: &MarketInfo, is_long: bool) -> Option<BigInt> {
        if is_long {
            let index_token = self.token(&info.market.index_token)?;
            let price = &index_token.prices()?.max;
            Some(index_token.to_usd(info.open_interest.in_tokens(true), price))
        } else {
            Some(info.open_interest.usd(false).clone())
        }
    }

    /// Max USD value that can be reserved for the positions of the given side.
    pub fn max_reserved_usd(&self, info: &MarketInfo, is_long: bool) -> Option<BigInt> {
        let pool_usd = self.pool_usd(info, is_long, PriceKind::Min)?;
        Some(utils::apply_factor(
            &pool_usd,
            info.config.reserve_factor(is_long),
        ))
    }

    /// Available USD liquidity for opening positions of the given side.
    ///
    /// Always zero for spot-only markets.
    pub fn available_usd_liquidity_for_position(
        &self,
        info: &MarketInfo,
        is_long: bool,
    ) -> Option<BigInt> {
        if info.market.is_spot_only {
            return Some(BigInt::zero());
        }
        let max_reserved = self.max_reserved_usd(info, is_long)?;
        let reserved = self.reserved_usd(info, is_long)?;
        Some(max_reserved - reserved)
    }

    /// Available USD liquidity of the collateral of the given side,
    /// i.e. the amount that can be swapped out of the pool.
    pub fn available_usd_liquidity_for_collateral(
        &self,
        info: &MarketInfo,
        is_long: bool,
    ) -> Option<BigInt> {
        let pool_usd = self.pool_usd(info, is_long, PriceKind::Min)?;
        if info.market.is_spot_only {
            return Some(pool_usd);
        }
        let reserve_factor = info.config.reserve_factor(is_long);
        if reserve_factor.is_zero() {
            return Some(BigInt::zero());
        }
        let reserved = self.reserved_usd(info, is_long)?;
        let min_pool_usd = reserved * utils::precision() / reserve_factor;
        Some(pool_usd - min_pool_usd)
    }
}
