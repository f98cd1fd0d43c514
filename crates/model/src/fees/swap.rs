use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::{num::SignedExt, snapshot::MarketsSnapshot, token::Address, utils};

use super::{PriceImpact, SwapStepFees, TotalSwapFees};

impl MarketsSnapshot {
    /// Fees of swapping `amount_in` of `token_in` through the given market.
    ///
    /// The swap fee is charged first. Price impact is then computed on the
    /// amounts after the swap fee:
    /// - a positive impact is paid out of the swap impact pool of the output
    ///   token and added to the output amount;
    /// - a negative impact is deducted from the input amount, and the output
    ///   amount is reduced by its value in output token.
    ///
    /// The output amount never goes below zero.
    ///
    /// Returns `None` if the swap cannot be priced.
    pub fn swap_fees(
        &self,
        market_token: &Address,
        token_in: &Address,
        amount_in: &BigInt,
    ) -> Option<SwapStepFees> {
        if !amount_in.is_positive() {
            return None;
        }
        let info = self.market(market_token)?;
        let token_out = info.market.opposite_token(token_in)?;
        let in_token = self.token(token_in)?;
        let out_token = self.token(token_out)?;
        let in_prices = in_token.prices()?;
        let out_prices = out_token.prices()?;

        let swap_fee_amount = info.config.fees.swap_fee_amount(amount_in);
        let swap_fee_usd = in_token.to_usd(&swap_fee_amount, &in_prices.min);

        let mut amount_in_after_fees = amount_in - &swap_fee_amount;
        let usd_in_after_fees = in_token.to_usd(&amount_in_after_fees, &in_prices.min);
        let mut amount_out = out_token.to_amount(&usd_in_after_fees, &out_prices.max)?;

        let price_impact =
            self.price_impact_for_swap(info, token_in, &amount_in_after_fees, &-&amount_out)?;

        let capped_impact_delta_usd = if price_impact.impact_delta_usd.is_positive() {
            let impact_amount = self.apply_swap_impact_with_cap(info, token_out, &price_impact)?;
            let capped = out_token.to_usd(&impact_amount, &out_prices.max);
            amount_out += impact_amount;
            capped
        } else {
            let impact_amount = self.apply_swap_impact_with_cap(info, token_in, &price_impact)?;
            let capped = in_token.to_usd(&impact_amount, &in_prices.min);
            amount_in_after_fees += impact_amount;
            amount_out -= out_token.to_amount(&-&capped, &out_prices.max)?;
            capped
        };

        let total_fee_usd = &swap_fee_usd - &capped_impact_delta_usd;

        Some(SwapStepFees {
            market: market_token.clone(),
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            swap_fee_amount,
            swap_fee_usd,
            capped_impact_delta_usd,
            total_fee_usd,
            amount_in_after_fees: amount_in_after_fees.floor_at_zero(),
            usd_in_after_fees,
            amount_out: amount_out.floor_at_zero(),
        })
    }

    /// Fees of swapping along `swap_path`, threading the output of each step
    /// into the next one.
    ///
    /// Returns `None` if the path is empty or any step cannot be priced.
    pub fn swap_path_fees(
        &self,
        swap_path: &[Address],
        token_in: &Address,
        amount_in: &BigInt,
    ) -> Option<TotalSwapFees> {
        let mut steps = Vec::with_capacity(swap_path.len());
        let mut token_in = token_in.clone();
        let mut amount_in = amount_in.clone();
        for market_token in swap_path {
            let step = self.swap_fees(market_token, &token_in, &amount_in)?;
            token_in = step.token_out.clone();
            amount_in = step.amount_out.clone();
            steps.push(step);
        }
        total_swap_fees(steps)
    }
}

/// Sum up the fees of swap steps.
///
/// The basis points of the total price impact are relative to the USD value
/// of the first step's input after the swap fee.
///
/// Returns `None` if there are no steps.
pub fn total_swap_fees(swaps: Vec<SwapStepFees>) -> Option<TotalSwapFees> {
    let first = swaps.first()?;
    let last = swaps.last()?;

    let mut impact_delta_usd = BigInt::zero();
    let mut total_swap_fee_usd = BigInt::zero();
    let mut total_fee_usd = BigInt::zero();
    for step in swaps.iter() {
        total_swap_fee_usd += &step.swap_fee_usd;
        impact_delta_usd += &step.capped_impact_delta_usd;
        total_fee_usd += &step.total_fee_usd;
    }

    let basis_points = if first.usd_in_after_fees.is_positive() {
        utils::basis_points(&impact_delta_usd, &first.usd_in_after_fees)
    } else {
        BigInt::zero()
    };

    Some(TotalSwapFees {
        token_in: first.token_in.clone(),
        token_out: last.token_out.clone(),
        amount_out: last.amount_out.clone(),
        total_price_impact: PriceImpact {
            impact_delta_usd,
            basis_points,
        },
        total_swap_fee_usd,
        total_fee_usd,
        swaps,
    })
}
