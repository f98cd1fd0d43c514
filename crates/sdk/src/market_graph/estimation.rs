use num_traits::Zero;
use synthetics_model::{BigInt, MarketsSnapshot};

use super::Edge;

/// Estimates the USD output of swapping `usd_in` through an edge.
///
/// An estimator returns zero when the edge cannot be used for the given input,
/// which removes the edge from the current search.
pub trait SwapEstimator {
    /// Estimate the USD output.
    fn estimate(&self, edge: &Edge, usd_in: &BigInt) -> BigInt;
}

impl<F> SwapEstimator for F
where
    F: Fn(&Edge, &BigInt) -> BigInt,
{
    fn estimate(&self, edge: &Edge, usd_in: &BigInt) -> BigInt {
        (self)(edge, usd_in)
    }
}

/// Estimator backed by the fees and liquidity of a [`MarketsSnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct SnapshotEstimator<'a> {
    snapshot: &'a MarketsSnapshot,
}

impl<'a> SnapshotEstimator<'a> {
    /// Create an estimator for the given snapshot.
    pub fn new(snapshot: &'a MarketsSnapshot) -> Self {
        Self { snapshot }
    }

    fn try_estimate(&self, edge: &Edge, usd_in: &BigInt) -> Option<BigInt> {
        let snapshot = self.snapshot;
        let info = snapshot.market(&edge.market_token)?;
        let token_in = snapshot.token(&edge.from)?;
        let token_out = snapshot.token(&edge.to)?;

        let amount_in = token_in.to_amount(usd_in, &token_in.prices()?.min)?;
        let fees = snapshot.swap_fees(&edge.market_token, &edge.from, &amount_in)?;
        let usd_out = token_out.to_usd(&fees.amount_out, &token_out.prices()?.max);

        let is_long_out = info.market.collateral_side(&edge.to)?;
        let liquidity = snapshot.available_usd_liquidity_for_collateral(info, is_long_out)?;
        if liquidity > usd_out {
            Some(usd_out)
        } else {
            tracing::trace!(
                market = %edge.market_token,
                %liquidity,
                %usd_out,
                "not enough liquidity for the swap step"
            );
            None
        }
    }
}

impl SwapEstimator for SnapshotEstimator<'_> {
    fn estimate(&self, edge: &Edge, usd_in: &BigInt) -> BigInt {
        self.try_estimate(edge, usd_in).unwrap_or_else(BigInt::zero)
    }
}
