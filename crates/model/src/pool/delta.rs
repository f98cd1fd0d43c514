use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::{params::PriceImpactParams, utils};

/// Usd values of the two sides of a pool.
#[derive(Debug, Clone)]
pub struct PoolValue {
    long_usd_value: BigInt,
    short_usd_value: BigInt,
}

impl PoolValue {
    /// Create a new [`PoolValue`].
    pub fn new(long_usd_value: BigInt, short_usd_value: BigInt) -> Self {
        Self {
            long_usd_value,
            short_usd_value,
        }
    }

    /// Get long usd value.
    pub fn long_value(&self) -> &BigInt {
        &self.long_usd_value
    }

    /// Get short usd value.
    pub fn short_value(&self) -> &BigInt {
        &self.short_usd_value
    }

    /// Get usd value (abs) difference.
    #[inline]
    pub fn diff_value(&self) -> BigInt {
        (&self.long_usd_value - &self.short_usd_value).abs()
    }

    #[inline]
    fn is_long_smaller(&self) -> bool {
        self.long_usd_value < self.short_usd_value
    }
}

/// Delta of pool usd values.
#[derive(Debug, Clone)]
pub struct PoolDelta {
    current: PoolValue,
    next: PoolValue,
    delta: PoolValue,
}

impl PoolDelta {
    /// Create a new [`PoolDelta`] from the current values and the deltas.
    pub fn new(current: PoolValue, long_delta_usd: BigInt, short_delta_usd: BigInt) -> Self {
        let next = PoolValue {
            long_usd_value: current.long_value() + &long_delta_usd,
            short_usd_value: current.short_value() + &short_delta_usd,
        };
        Self {
            current,
            next,
            delta: PoolValue::new(long_delta_usd, short_delta_usd),
        }
    }

    /// Get current values.
    pub fn current(&self) -> &PoolValue {
        &self.current
    }

    /// Get next values.
    pub fn next(&self) -> &PoolValue {
        &self.next
    }

    /// Get delta values.
    pub fn delta(&self) -> &PoolValue {
        &self.delta
    }

    /// Returns whether both deltas are zero.
    pub fn is_empty(&self) -> bool {
        self.delta.long_value().is_zero() && self.delta.short_value().is_zero()
    }

    /// Total size of the trade, i.e. `|long delta| + |short delta|`.
    pub fn trade_size(&self) -> BigInt {
        self.delta.long_value().abs() + self.delta.short_value().abs()
    }

    /// Initial diff usd value.
    #[inline]
    pub fn initial_diff_value(&self) -> BigInt {
        self.current.diff_value()
    }

    /// Next diff usd value.
    #[inline]
    pub fn next_diff_value(&self) -> BigInt {
        self.next.diff_value()
    }

    /// Returns whether it is a same side rebalance.
    #[inline]
    pub fn is_same_side_rebalance(&self) -> bool {
        self.current.is_long_smaller() == self.next.is_long_smaller()
    }

    /// Calculate price impact.
    pub fn price_impact(&self, params: &PriceImpactParams) -> crate::Result<BigInt> {
        if self.is_same_side_rebalance() {
            self.price_impact_for_same_side_rebalance(params)
        } else {
            self.price_impact_for_cross_over_rebalance(params)
        }
    }

    #[inline]
    fn price_impact_for_same_side_rebalance(
        &self,
        params: &PriceImpactParams,
    ) -> crate::Result<BigInt> {
        let initial = self.initial_diff_value();
        let next = self.next_diff_value();
        let has_positive_impact = next < initial;

        let factor = params.factor(has_positive_impact);
        let exponent_factor = params.exponent();

        let initial = utils::apply_impact_factor(&initial, factor, exponent_factor)?;
        let next = utils::apply_impact_factor(&next, factor, exponent_factor)?;
        let delta = (initial - next).abs();
        Ok(if has_positive_impact { delta } else { -delta })
    }

    #[inline]
    fn price_impact_for_cross_over_rebalance(
        &self,
        params: &PriceImpactParams,
    ) -> crate::Result<BigInt> {
        let initial = self.initial_diff_value();
        let next = self.next_diff_value();
        let exponent_factor = params.exponent();
        let positive_impact =
            utils::apply_impact_factor(&initial, params.positive_factor(), exponent_factor)?;
        let negative_impact =
            utils::apply_impact_factor(&next, params.negative_factor(), exponent_factor)?;
        Ok(positive_impact - negative_impact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::usd;

    #[test]
    fn same_side_and_cross_over() {
        let current = PoolValue::new(usd(1_000), usd(600));

        let delta = PoolDelta::new(current.clone(), usd(0), usd(300));
        assert!(delta.is_same_side_rebalance());
        assert_eq!(delta.initial_diff_value(), usd(400));
        assert_eq!(delta.next_diff_value(), usd(100));

        let delta = PoolDelta::new(current.clone(), usd(0), usd(500));
        assert!(!delta.is_same_side_rebalance());
        assert_eq!(delta.next_diff_value(), usd(100));

        let delta = PoolDelta::new(current, usd(0), usd(0));
        assert!(delta.is_empty());
    }
}
