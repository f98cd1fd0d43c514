/// Value.
pub mod value;

/// Market Status.
pub mod status;

use synthetics_model::{price::PriceKind, utils, Address, BigInt, MarketInfo, MarketsSnapshot};

pub use self::{status::MarketStatus, value::Value};

/// A market together with its available liquidity for a side.
#[derive(Debug, Clone)]
pub struct MarketLiquidity<'a> {
    /// Market.
    pub info: &'a MarketInfo,
    /// Available USD liquidity.
    pub liquidity: BigInt,
}

/// Market Calculations.
pub trait MarketCalculations {
    /// Calculate market status.
    fn status(&self, market_token: &Address) -> crate::Result<MarketStatus>;

    /// Find the market to open a position in.
    ///
    /// Among the markets of `index_token` having `collateral_token` as one of
    /// their collateral tokens and enough liquidity for `size_delta_usd`, the
    /// one with the smallest sufficient liquidity is chosen. On ties the
    /// earliest market wins.
    fn best_market_for_position(
        &self,
        index_token: &Address,
        collateral_token: &Address,
        is_long: bool,
        size_delta_usd: &BigInt,
    ) -> Option<MarketLiquidity<'_>>;
}

impl MarketCalculations for MarketsSnapshot {
    fn status(&self, market_token: &Address) -> crate::Result<MarketStatus> {
        let info = self.try_market(market_token)?;
        let missing = || crate::Error::unknown(format!("missing prices for market {market_token}"));

        let index_token = self.token(&info.market.index_token).ok_or_else(missing)?;
        let index_price = index_token.prices().ok_or_else(missing)?;
        let pending_pnl = |is_long: bool| -> Value {
            let oi_usd = info.open_interest.usd(is_long);
            let oi_in_tokens = info.open_interest.in_tokens(is_long);
            let pnl = |maximize: bool| {
                // Traders of long positions gain when the price goes up.
                let price = index_price.pick(maximize == is_long);
                let value = index_token.to_usd(oi_in_tokens, price);
                if is_long {
                    value - oi_usd
                } else {
                    oi_usd - value
                }
            };
            Value {
                min: pnl(false),
                max: pnl(true),
            }
        };
        let pool_value = |is_long: bool| -> crate::Result<Value> {
            Ok(Value {
                min: self
                    .pool_usd(info, is_long, PriceKind::Min)
                    .ok_or_else(missing)?,
                max: self
                    .pool_usd(info, is_long, PriceKind::Max)
                    .ok_or_else(missing)?,
            })
        };

        let reserved_value_for_long = self.reserved_usd(info, true).ok_or_else(missing)?;
        let reserved_value_for_short = self.reserved_usd(info, false).ok_or_else(missing)?;
        let pool_value_for_long = pool_value(true)?;
        let pool_value_for_short = pool_value(false)?;
        let max_reserved_value_for_long =
            utils::apply_factor(&pool_value_for_long.min, info.config.reserve_factor(true));
        let max_reserved_value_for_short =
            utils::apply_factor(&pool_value_for_short.min, info.config.reserve_factor(false));
        let fees = &info.config.fees;

        Ok(MarketStatus {
            funding_rate_per_hour_for_long: fees.funding_factor_per_hour(true),
            funding_rate_per_hour_for_short: fees.funding_factor_per_hour(false),
            borrowing_rate_per_hour_for_long: fees.borrowing_factor_per_hour(true),
            borrowing_rate_per_hour_for_short: fees.borrowing_factor_per_hour(false),
            pending_pnl_for_long: pending_pnl(true),
            pending_pnl_for_short: pending_pnl(false),
            liquidity_for_long: self
                .available_usd_liquidity_for_position(info, true)
                .ok_or_else(missing)?,
            liquidity_for_short: self
                .available_usd_liquidity_for_position(info, false)
                .ok_or_else(missing)?,
            reserved_value_for_long,
            reserved_value_for_short,
            max_reserved_value_for_long,
            max_reserved_value_for_short,
            pool_value_for_long,
            pool_value_for_short,
            open_interest_for_long: info.open_interest.usd(true).clone(),
            open_interest_for_short: info.open_interest.usd(false).clone(),
            open_interest_in_tokens_for_long: info.open_interest.in_tokens(true).clone(),
            open_interest_in_tokens_for_short: info.open_interest.in_tokens(false).clone(),
        })
    }

    fn best_market_for_position(
        &self,
        index_token: &Address,
        collateral_token: &Address,
        is_long: bool,
        size_delta_usd: &BigInt,
    ) -> Option<MarketLiquidity<'_>> {
        let mut best: Option<MarketLiquidity<'_>> = None;
        for info in self.markets() {
            let market = &info.market;
            if market.is_spot_only
                || market.index_token != *index_token
                || !market.is_collateral_token(collateral_token)
            {
                continue;
            }
            let Some(liquidity) = self.available_usd_liquidity_for_position(info, is_long) else {
                continue;
            };
            if liquidity < *size_delta_usd {
                continue;
            }
            let is_better = best
                .as_ref()
                .map(|current| liquidity < current.liquidity)
                .unwrap_or(true);
            if is_better {
                best = Some(MarketLiquidity { info, liquidity });
            }
        }
        if let Some(best) = best.as_ref() {
            tracing::debug!(
                market = %best.info.address(),
                liquidity = %best.liquidity,
                "found best market"
            );
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use synthetics_model::{
        pool::OpenInterest,
        test::{self, address, btc, dai, eth, usdc},
        utils::usd,
    };

    use super::*;

    #[test]
    fn picks_smallest_sufficient_liquidity() {
        // Long liquidity is 80% of the long pool: $800k for market 10 and $400k for market 13.
        let mut snapshot = test::snapshot();
        snapshot
            .insert_market(test::market_info(
                address(13),
                eth(),
                (&eth(), 500, 18),
                (&usdc(), 500_000, 6),
                test::config_with_swap_fee(10),
            ))
            .unwrap();

        let best = snapshot
            .best_market_for_position(&eth(), &usdc(), true, &usd(100_000))
            .unwrap();
        assert_eq!(*best.info.address(), address(13));
        assert_eq!(best.liquidity, usd(400_000));

        let best = snapshot
            .best_market_for_position(&eth(), &usdc(), true, &usd(500_000))
            .unwrap();
        assert_eq!(*best.info.address(), address(10));

        assert!(snapshot
            .best_market_for_position(&eth(), &usdc(), true, &usd(900_000))
            .is_none());
    }

    #[test]
    fn collateral_and_index_must_match() {
        let snapshot = test::snapshot();
        let best = snapshot
            .best_market_for_position(&eth(), &dai(), false, &usd(1_000))
            .unwrap();
        assert_eq!(*best.info.address(), address(12));
        assert!(snapshot
            .best_market_for_position(&btc(), &dai(), false, &usd(1_000))
            .is_none());
        assert!(snapshot
            .best_market_for_position(&eth(), &btc(), true, &usd(1_000))
            .is_none());
    }

    #[test]
    fn never_below_requested_size() {
        let snapshot = test::snapshot();
        for units in [0u64, 1, 10_000, 400_000, 800_000, 800_001, 2_000_000] {
            let size = usd(units);
            if let Some(best) = snapshot.best_market_for_position(&eth(), &usdc(), true, &size) {
                assert!(best.liquidity >= size);
            }
        }
    }

    #[test]
    fn market_status() -> crate::Result<()> {
        let mut snapshot = test::tokens();
        let info = test::market_info(
            address(10),
            eth(),
            (&eth(), 1_000, 18),
            (&usdc(), 1_000_000, 6),
            test::config_with_swap_fee(10),
        )
        .with_open_interest(OpenInterest {
            long_usd: usd(100_000),
            short_usd: usd(50_000),
            long_in_tokens: test::amount(110, 18),
            short_in_tokens: test::amount(50, 18),
        });
        snapshot.insert_market(info)?;

        let status = snapshot.status(&address(10))?;
        assert_eq!(status.pool_value_for_long.min, usd(1_000_000));
        assert_eq!(status.reserved_value_for_long, usd(110_000));
        assert_eq!(status.max_reserved_value_for_long, usd(800_000));
        assert_eq!(*status.liquidity(true), usd(690_000));
        assert_eq!(*status.liquidity(false), usd(750_000));
        assert_eq!(status.pending_pnl_for_long.max, usd(10_000));
        assert_eq!(status.pending_pnl_for_short.min, BigInt::from(0));

        assert!(snapshot.status(&address(99)).is_err());
        Ok(())
    }
}
