use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use typed_builder::TypedBuilder;

use crate::{num::SignedExt, snapshot::MarketsSnapshot, token::Address, utils};

use super::{PriceImpact, TotalSwapFees};

/// Params of an increase or decrease position order.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PositionOrderParams {
    /// Market token of the position.
    pub market: Address,
    /// Collateral token of the position.
    pub collateral_token: Address,
    /// Side.
    pub is_long: bool,
    /// Whether the order increases the position.
    pub is_increase: bool,
    /// Size delta in USD.
    #[builder(default)]
    pub size_delta_usd: BigInt,
    /// For increases, the amount of the initial collateral token paid in.
    /// For decreases, the amount of collateral token withdrawn.
    #[builder(default)]
    pub collateral_delta_amount: BigInt,
    /// For increases, the token paid in. For decreases, the token to receive.
    /// Defaults to the collateral token.
    #[builder(default, setter(strip_option))]
    pub initial_collateral_token: Option<Address>,
    /// Markets to swap through.
    #[builder(default)]
    pub swap_path: Vec<Address>,
    /// Pending borrowing fees settled by a decrease.
    #[builder(default)]
    pub pending_borrowing_fees_usd: BigInt,
    /// Pending funding fees settled by a decrease.
    #[builder(default)]
    pub pending_funding_fees_usd: BigInt,
    /// PnL realized by a decrease.
    #[builder(default)]
    pub realized_pnl_usd: BigInt,
}

/// Fee breakdown of a position order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PositionOrderFees {
    /// Fees of the collateral swap, if any.
    pub swaps: Option<TotalSwapFees>,
    /// Position fee in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub position_fee_usd: BigInt,
    /// Position fee in collateral token.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub position_fee_amount: BigInt,
    /// Uncapped position price impact.
    pub position_price_impact: Option<PriceImpact>,
    /// Position price impact after applying the caps.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub capped_position_impact_usd: BigInt,
    /// Borrowing fees settled by the order.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub borrowing_fee_usd: BigInt,
    /// Funding fees settled by the order.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub funding_fee_usd: BigInt,
    /// USD value of the collateral entering or leaving the position, before fees.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub collateral_usd: BigInt,
    /// Collateral amount after fees.
    ///
    /// In collateral token for increases, in the receive token for decreases.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub collateral_amount_after_fees: BigInt,
    /// Total cost in USD. Negative if the rebates exceed the fees.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub total_fee_usd: BigInt,
    /// Total cost relative to [`collateral_usd`](Self::collateral_usd) in basis points.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub total_fee_basis_points: BigInt,
}

impl MarketsSnapshot {
    /// Fees of a position order.
    ///
    /// Increases swap the initial collateral into the collateral token before
    /// charging the position fee. Decreases charge the position fee and settle
    /// pending fees first, then swap the output into the receive token.
    ///
    /// Returns `None` if the order cannot be priced.
    pub fn position_order_fees(&self, params: &PositionOrderParams) -> Option<PositionOrderFees> {
        if params.is_increase {
            self.increase_order_fees(params)
        } else {
            self.decrease_order_fees(params)
        }
    }

    fn position_impact(
        &self,
        params: &PositionOrderParams,
        size_delta_usd: &BigInt,
    ) -> Option<(Option<PriceImpact>, BigInt)> {
        let info = self.market(&params.market)?;
        let impact = self.price_impact_for_position(info, size_delta_usd, params.is_long);
        let capped = match impact.as_ref() {
            Some(impact) => self.capped_position_impact_usd(info, impact, size_delta_usd)?,
            None => BigInt::zero(),
        };
        Some((impact, capped))
    }

    fn increase_order_fees(&self, params: &PositionOrderParams) -> Option<PositionOrderFees> {
        let info = self.market(&params.market)?;
        if !info.market.is_collateral_token(&params.collateral_token) {
            return None;
        }
        let collateral = self.token(&params.collateral_token)?;
        let collateral_price = &collateral.prices()?.min;

        let initial_token = params
            .initial_collateral_token
            .as_ref()
            .unwrap_or(&params.collateral_token);
        let (swaps, collateral_amount) = if params.swap_path.is_empty() {
            if *initial_token != params.collateral_token {
                return None;
            }
            (None, params.collateral_delta_amount.clone())
        } else {
            let swaps = self.swap_path_fees(
                &params.swap_path,
                initial_token,
                &params.collateral_delta_amount,
            )?;
            if swaps.token_out != params.collateral_token {
                return None;
            }
            let amount_out = swaps.amount_out.clone();
            (Some(swaps), amount_out)
        };
        let collateral_usd = collateral.to_usd(&collateral_amount, collateral_price);

        let position_fee_usd = info.config.fees.position_fee_usd(&params.size_delta_usd);
        let position_fee_amount = collateral.to_amount(&position_fee_usd, collateral_price)?;
        let (position_price_impact, capped_position_impact_usd) =
            self.position_impact(params, &params.size_delta_usd)?;

        let swap_fee_usd = swaps
            .as_ref()
            .map(|swaps| swaps.total_fee_usd.clone())
            .unwrap_or_default();
        let total_fee_usd = swap_fee_usd + &position_fee_usd - &capped_position_impact_usd;

        Some(PositionOrderFees {
            swaps,
            total_fee_basis_points: fee_basis_points(&total_fee_usd, &collateral_usd),
            collateral_amount_after_fees: (collateral_amount - &position_fee_amount)
                .floor_at_zero(),
            position_fee_usd,
            position_fee_amount,
            position_price_impact,
            capped_position_impact_usd,
            borrowing_fee_usd: BigInt::zero(),
            funding_fee_usd: BigInt::zero(),
            collateral_usd,
            total_fee_usd,
        })
    }

    fn decrease_order_fees(&self, params: &PositionOrderParams) -> Option<PositionOrderFees> {
        let info = self.market(&params.market)?;
        if !info.market.is_collateral_token(&params.collateral_token) {
            return None;
        }
        let collateral = self.token(&params.collateral_token)?;
        let collateral_price = &collateral.prices()?.min;

        let collateral_usd = collateral.to_usd(&params.collateral_delta_amount, collateral_price);
        let position_fee_usd = info.config.fees.position_fee_usd(&params.size_delta_usd);
        let position_fee_amount = collateral.to_amount(&position_fee_usd, collateral_price)?;
        let (position_price_impact, capped_position_impact_usd) =
            self.position_impact(params, &-&params.size_delta_usd)?;

        let borrowing_fee_usd = params.pending_borrowing_fees_usd.clone();
        let funding_fee_usd = params.pending_funding_fees_usd.clone();
        let output_usd = &collateral_usd + &params.realized_pnl_usd + &capped_position_impact_usd
            - &position_fee_usd
            - &borrowing_fee_usd
            - &funding_fee_usd;
        let output_amount = collateral.to_amount(&output_usd.floor_at_zero(), collateral_price)?;

        let receive_token = params
            .initial_collateral_token
            .as_ref()
            .unwrap_or(&params.collateral_token);
        let swaps = if params.swap_path.is_empty() || !output_amount.is_positive() {
            None
        } else {
            let swaps =
                self.swap_path_fees(&params.swap_path, &params.collateral_token, &output_amount)?;
            if swaps.token_out != *receive_token {
                return None;
            }
            Some(swaps)
        };
        let collateral_amount_after_fees = swaps
            .as_ref()
            .map(|swaps| swaps.amount_out.clone())
            .unwrap_or(output_amount);

        let swap_fee_usd = swaps
            .as_ref()
            .map(|swaps| swaps.total_fee_usd.clone())
            .unwrap_or_default();
        let total_fee_usd = swap_fee_usd + &position_fee_usd + &borrowing_fee_usd + &funding_fee_usd
            - &capped_position_impact_usd;

        Some(PositionOrderFees {
            swaps,
            total_fee_basis_points: fee_basis_points(&total_fee_usd, &collateral_usd),
            position_fee_usd,
            position_fee_amount,
            position_price_impact,
            capped_position_impact_usd,
            borrowing_fee_usd,
            funding_fee_usd,
            collateral_usd,
            collateral_amount_after_fees,
            total_fee_usd,
        })
    }
}

fn fee_basis_points(fee_usd: &BigInt, collateral_usd: &BigInt) -> BigInt {
    if collateral_usd.is_positive() {
        utils::basis_points(fee_usd, collateral_usd)
    } else {
        BigInt::zero()
    }
}
