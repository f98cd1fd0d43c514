use std::ops::Deref;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use typed_builder::TypedBuilder;

use crate::{
    constants::{BASIS_POINTS_DIVISOR, MAX_ALLOWED_LEVERAGE},
    fixed::pow10,
    num::SignedExt,
    price::mark_price,
    snapshot::MarketsSnapshot,
    token::Address,
    utils, MarketInfo,
};

/// Position snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Position {
    /// Owner.
    pub account: Address,
    /// Market token.
    pub market: Address,
    /// Collateral token.
    pub collateral_token: Address,
    /// Side.
    pub is_long: bool,
    /// Size in USD.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub size_in_usd: BigInt,
    /// Size in index tokens.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub size_in_tokens: BigInt,
    /// Collateral amount.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub collateral_amount: BigInt,
    /// Accrued borrowing fees not yet paid.
    #[cfg_attr(
        feature = "serde",
        serde(default),
        serde_as(as = "serde_with::DisplayFromStr")
    )]
    pub pending_borrowing_fees_usd: BigInt,
    /// Accrued funding fees not yet paid.
    #[cfg_attr(
        feature = "serde",
        serde(default),
        serde_as(as = "serde_with::DisplayFromStr")
    )]
    pub pending_funding_fees_usd: BigInt,
    /// Block of the last increase.
    #[cfg_attr(feature = "serde", serde(default))]
    pub increased_at_block: u64,
    /// Block of the last decrease.
    #[cfg_attr(feature = "serde", serde(default))]
    pub decreased_at_block: u64,
}

impl Position {
    /// Sum of pending borrowing and funding fees.
    pub fn pending_fees_usd(&self) -> BigInt {
        &self.pending_borrowing_fees_usd + &self.pending_funding_fees_usd
    }

    /// Returns whether the position has been fully closed.
    pub fn is_empty(&self) -> bool {
        !self.size_in_usd.is_positive() && !self.size_in_tokens.is_positive()
    }
}

/// Average entry price of one whole index token.
///
/// Returns `None` if the size in tokens is not positive.
pub fn entry_price(
    size_in_usd: &BigInt,
    size_in_tokens: &BigInt,
    index_decimals: u8,
) -> Option<BigInt> {
    if !size_in_tokens.is_positive() {
        return None;
    }
    Some(size_in_usd * pow10(index_decimals as u32) / size_in_tokens)
}

/// Unrealized PnL of a position valued at `mark_price`.
pub fn position_pnl(
    size_in_usd: &BigInt,
    size_in_tokens: &BigInt,
    mark_price: &BigInt,
    is_long: bool,
    index_decimals: u8,
) -> BigInt {
    let value = utils::convert_to_usd(size_in_tokens, index_decimals, mark_price);
    if is_long {
        value - size_in_usd
    } else {
        size_in_usd - value
    }
}

/// Leverage in basis points.
///
/// The effective collateral is the collateral minus pending fees, plus `pnl`
/// if provided. Returns `None` if the effective collateral is not positive.
pub fn leverage(
    size_in_usd: &BigInt,
    collateral_usd: &BigInt,
    pnl: Option<&BigInt>,
    pending_fees_usd: &BigInt,
) -> Option<BigInt> {
    let mut remaining = collateral_usd - pending_fees_usd;
    if let Some(pnl) = pnl {
        remaining += pnl;
    }
    if !remaining.is_positive() {
        return None;
    }
    Some(size_in_usd * BASIS_POINTS_DIVISOR / remaining)
}

/// Params for estimating the liquidation price.
#[derive(Debug, Clone, TypedBuilder)]
pub struct LiquidationPriceParams {
    /// Size in USD.
    pub size_in_usd: BigInt,
    /// Size in index tokens.
    pub size_in_tokens: BigInt,
    /// Collateral amount.
    pub collateral_amount: BigInt,
    /// Collateral value in USD.
    pub collateral_usd: BigInt,
    /// Whether the collateral token is the index token.
    #[builder(default)]
    pub collateral_is_index_token: bool,
    /// Decimals of the index token.
    pub index_decimals: u8,
    /// Pending borrowing and funding fees.
    #[builder(default)]
    pub pending_fees_usd: BigInt,
    /// Position fee for closing the position.
    #[builder(default)]
    pub closing_fee_usd: BigInt,
    /// Price impact of closing the position, expected to be non-positive.
    #[builder(default)]
    pub price_impact_delta_usd: BigInt,
    /// Min collateral value.
    pub min_collateral_usd: BigInt,
    /// Min collateral factor.
    pub min_collateral_factor: BigInt,
    /// Side.
    pub is_long: bool,
}

impl LiquidationPriceParams {
    /// Collateral value at which the position becomes liquidatable.
    pub fn liquidation_collateral_usd(&self) -> BigInt {
        let by_factor = utils::apply_factor(&self.size_in_usd, &self.min_collateral_factor);
        if by_factor < self.min_collateral_usd {
            self.min_collateral_usd.clone()
        } else {
            by_factor
        }
    }

    /// Estimate the index price at which the position becomes liquidatable.
    ///
    /// Returns `None` if the position is empty or the price is not positive.
    pub fn liquidation_price(&self) -> Option<BigInt> {
        if !self.size_in_usd.is_positive() || !self.size_in_tokens.is_positive() {
            return None;
        }
        let unit = pow10(self.index_decimals as u32);
        let liquidation_collateral_usd = self.liquidation_collateral_usd();
        let total_fees_usd = &self.pending_fees_usd + &self.closing_fee_usd;
        let impact = &self.price_impact_delta_usd;

        let (numerator, denominator) = if self.collateral_is_index_token {
            if self.is_long {
                (
                    &self.size_in_usd + &liquidation_collateral_usd - impact + &total_fees_usd,
                    &self.size_in_tokens + &self.collateral_amount,
                )
            } else {
                (
                    &self.size_in_usd - &liquidation_collateral_usd + impact - &total_fees_usd,
                    &self.size_in_tokens - &self.collateral_amount,
                )
            }
        } else {
            let remaining_collateral_usd = &self.collateral_usd + impact - &total_fees_usd;
            let base = &liquidation_collateral_usd - &remaining_collateral_usd;
            if self.is_long {
                (base + &self.size_in_usd, self.size_in_tokens.clone())
            } else {
                (base - &self.size_in_usd, -&self.size_in_tokens)
            }
        };
        if denominator.is_zero() {
            return None;
        }
        let price = numerator * unit / denominator;
        price.is_positive().then_some(price)
    }
}

/// Result of the collateral sufficiency check, carrying the remaining collateral value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WillCollateralBeSufficient {
    /// Will be sufficient.
    Sufficient(BigInt),
    /// Won't be sufficient.
    Insufficient(BigInt),
}

impl WillCollateralBeSufficient {
    /// Returns whether it is sufficient.
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Self::Sufficient(_))
    }
}

impl Deref for WillCollateralBeSufficient {
    type Target = BigInt;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Sufficient(v) => v,
            Self::Insufficient(v) => v,
        }
    }
}

/// Check whether the collateral left after a change still backs the next size.
///
/// Negative realized PnL is deducted from the next collateral value.
pub fn will_collateral_be_sufficient(
    next_collateral_usd: &BigInt,
    realized_pnl_usd: &BigInt,
    next_size_in_usd: &BigInt,
    min_collateral_factor: &BigInt,
) -> WillCollateralBeSufficient {
    let mut remaining = next_collateral_usd.clone();
    if realized_pnl_usd.is_negative() {
        remaining += realized_pnl_usd;
    }
    if remaining.is_negative() {
        return WillCollateralBeSufficient::Insufficient(remaining);
    }
    let min_collateral_usd_for_leverage =
        utils::apply_factor(next_size_in_usd, min_collateral_factor);
    if remaining < min_collateral_usd_for_leverage {
        WillCollateralBeSufficient::Insufficient(remaining)
    } else {
        WillCollateralBeSufficient::Sufficient(remaining)
    }
}

/// Derived display values of a position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PositionInfo {
    /// Position.
    pub position: Position,
    /// Entry price.
    #[cfg_attr(feature = "serde", serde_as(as = "Option<serde_with::DisplayFromStr>"))]
    pub entry_price: Option<BigInt>,
    /// Mark price for closing the position.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub mark_price: BigInt,
    /// Unrealized PnL.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub pnl: BigInt,
    /// Unrealized PnL relative to the collateral value in basis points.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub pnl_basis_points: BigInt,
    /// Unrealized PnL minus pending fees and the closing fee.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub pnl_after_fees: BigInt,
    /// Collateral value in USD at the min price.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub collateral_usd: BigInt,
    /// Collateral value minus pending fees.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub remaining_collateral_usd: BigInt,
    /// Remaining collateral in collateral tokens at the min price.
    #[cfg_attr(feature = "serde", serde_as(as = "Option<serde_with::DisplayFromStr>"))]
    pub remaining_collateral_amount: Option<BigInt>,
    /// Pending borrowing and funding fees.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub pending_fees_usd: BigInt,
    /// Position fee for closing the whole position.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub closing_fee_usd: BigInt,
    /// Collateral minus fees plus PnL.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub net_value: BigInt,
    /// PnL after fees relative to the collateral value plus the closing fee,
    /// in basis points. Zero without collateral.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub pnl_after_fees_percentage: BigInt,
    /// Leverage in basis points, without PnL.
    #[cfg_attr(feature = "serde", serde_as(as = "Option<serde_with::DisplayFromStr>"))]
    pub leverage: Option<BigInt>,
    /// Leverage in basis points, with PnL.
    #[cfg_attr(feature = "serde", serde_as(as = "Option<serde_with::DisplayFromStr>"))]
    pub leverage_with_pnl: Option<BigInt>,
    /// Estimated liquidation price.
    #[cfg_attr(feature = "serde", serde_as(as = "Option<serde_with::DisplayFromStr>"))]
    pub liquidation_price: Option<BigInt>,
    /// Whether the leverage is above [`MAX_ALLOWED_LEVERAGE`].
    pub has_low_collateral: bool,
}

/// Amounts of a decrease order and the state of the position after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecreasePositionAmounts {
    /// Size delta in USD, capped by the position size.
    pub size_delta_usd: BigInt,
    /// Size delta in index tokens.
    pub size_delta_in_tokens: BigInt,
    /// Collateral withdrawn.
    pub collateral_delta_amount: BigInt,
    /// Realized PnL.
    pub realized_pnl_usd: BigInt,
    /// Whether the order closes the whole position.
    pub is_full_close: bool,
    /// Whether the requested withdrawal was dropped because the remaining
    /// collateral would not be sufficient.
    pub is_collateral_withdrawal_dropped: bool,
    /// Size after the order.
    pub next_size_usd: BigInt,
    /// Collateral amount after the order.
    pub next_collateral_amount: BigInt,
    /// Collateral value after the order.
    pub next_collateral_usd: BigInt,
    /// Leverage after the order in basis points.
    pub next_leverage: Option<BigInt>,
    /// Liquidation price after the order.
    pub next_liquidation_price: Option<BigInt>,
}

impl MarketsSnapshot {
    fn liquidation_params(
        &self,
        info: &MarketInfo,
        position: &Position,
        size_in_usd: &BigInt,
        size_in_tokens: &BigInt,
        collateral_amount: &BigInt,
    ) -> Option<LiquidationPriceParams> {
        let index_token = self.token(&info.market.index_token)?;
        let collateral = self.token(&position.collateral_token)?;
        let collateral_usd = collateral.to_usd(collateral_amount, &collateral.prices()?.min);
        let fees = &info.config.fees;

        let max_negative_impact =
            -utils::apply_factor(size_in_usd, &fees.max_position_impact_factor_for_liquidations);
        let price_impact_delta_usd = self
            .price_impact_for_position(info, &-size_in_usd, position.is_long)
            .map(|impact| impact.impact_delta_usd)
            .unwrap_or_default()
            .min_of(BigInt::zero());
        let price_impact_delta_usd = if price_impact_delta_usd < max_negative_impact {
            max_negative_impact
        } else {
            price_impact_delta_usd
        };

        Some(
            LiquidationPriceParams::builder()
                .size_in_usd(size_in_usd.clone())
                .size_in_tokens(size_in_tokens.clone())
                .collateral_amount(collateral_amount.clone())
                .collateral_usd(collateral_usd)
                .collateral_is_index_token(position.collateral_token == info.market.index_token)
                .index_decimals(index_token.decimals)
                .pending_fees_usd(position.pending_fees_usd())
                .closing_fee_usd(fees.position_fee_usd(size_in_usd))
                .price_impact_delta_usd(price_impact_delta_usd)
                .min_collateral_usd(self.min_collateral_usd().clone())
                .min_collateral_factor(info.config.min_collateral_factor.clone())
                .is_long(position.is_long)
                .build(),
        )
    }

    /// Liquidation price of a position.
    pub fn liquidation_price(&self, position: &Position) -> Option<BigInt> {
        let info = self.market(&position.market)?;
        self.liquidation_params(
            info,
            position,
            &position.size_in_usd,
            &position.size_in_tokens,
            &position.collateral_amount,
        )?
        .liquidation_price()
    }

    /// Derive the display values of a position.
    ///
    /// Returns `None` if the market or prices are missing.
    pub fn position_info(&self, position: &Position) -> Option<PositionInfo> {
        let info = self.market(&position.market)?;
        let index_token = self.token(&info.market.index_token)?;
        let collateral = self.token(&position.collateral_token)?;

        let mark_price = mark_price(index_token.prices()?, false, position.is_long).clone();
        let collateral_usd =
            collateral.to_usd(&position.collateral_amount, &collateral.prices()?.min);
        let pnl = position_pnl(
            &position.size_in_usd,
            &position.size_in_tokens,
            &mark_price,
            position.is_long,
            index_token.decimals,
        );
        let pending_fees_usd = position.pending_fees_usd();
        let closing_fee_usd = info.config.fees.position_fee_usd(&position.size_in_usd);
        let pnl_after_fees = &pnl - &pending_fees_usd - &closing_fee_usd;
        let net_value = &collateral_usd + &pnl_after_fees;
        let pnl_basis_points = if collateral_usd.is_positive() {
            utils::basis_points(&pnl, &collateral_usd)
        } else {
            BigInt::zero()
        };
        let pnl_after_fees_percentage = if collateral_usd.is_zero() {
            BigInt::zero()
        } else {
            utils::basis_points(&pnl_after_fees, &(&collateral_usd + &closing_fee_usd))
        };
        let remaining_collateral_usd = &collateral_usd - &pending_fees_usd;
        let remaining_collateral_amount =
            collateral.to_amount(&remaining_collateral_usd, &collateral.prices()?.min);
        let leverage_without_pnl =
            leverage(&position.size_in_usd, &collateral_usd, None, &pending_fees_usd);
        let has_low_collateral = leverage_without_pnl
            .as_ref()
            .is_some_and(|leverage| *leverage > BigInt::from(MAX_ALLOWED_LEVERAGE));

        Some(PositionInfo {
            entry_price: entry_price(
                &position.size_in_usd,
                &position.size_in_tokens,
                index_token.decimals,
            ),
            leverage: leverage_without_pnl,
            leverage_with_pnl: leverage(
                &position.size_in_usd,
                &collateral_usd,
                Some(&pnl),
                &pending_fees_usd,
            ),
            liquidation_price: self.liquidation_price(position),
            remaining_collateral_usd,
            remaining_collateral_amount,
            position: position.clone(),
            mark_price,
            pnl,
            pnl_basis_points,
            pnl_after_fees,
            collateral_usd,
            pending_fees_usd,
            closing_fee_usd,
            net_value,
            pnl_after_fees_percentage,
            has_low_collateral,
        })
    }

    /// Amounts of decreasing a position by `size_delta_usd` and withdrawing
    /// `collateral_delta_amount`.
    ///
    /// With `keep_leverage`, the withdrawal is replaced by the share of the
    /// collateral proportional to the closed size. A partial withdrawal that
    /// would leave insufficient collateral is dropped.
    pub fn decrease_position_amounts(
        &self,
        position: &Position,
        size_delta_usd: &BigInt,
        collateral_delta_amount: &BigInt,
        keep_leverage: bool,
    ) -> Option<DecreasePositionAmounts> {
        if !position.size_in_usd.is_positive() || size_delta_usd.is_negative() {
            return None;
        }
        let info = self.market(&position.market)?;
        let index_token = self.token(&info.market.index_token)?;
        let collateral = self.token(&position.collateral_token)?;
        let collateral_price = &collateral.prices()?.min;
        let mark_price = mark_price(index_token.prices()?, false, position.is_long);

        let is_full_close = *size_delta_usd >= position.size_in_usd;
        let size_delta_usd = size_delta_usd.clone().min_of(position.size_in_usd.clone());
        let size_delta_in_tokens = if is_full_close {
            position.size_in_tokens.clone()
        } else {
            &position.size_in_tokens * &size_delta_usd / &position.size_in_usd
        };

        let pnl = position_pnl(
            &position.size_in_usd,
            &position.size_in_tokens,
            mark_price,
            position.is_long,
            index_token.decimals,
        );
        let realized_pnl_usd = if position.size_in_tokens.is_positive() {
            &pnl * &size_delta_in_tokens / &position.size_in_tokens
        } else {
            BigInt::zero()
        };

        let mut collateral_delta_amount = if is_full_close {
            position.collateral_amount.clone()
        } else if keep_leverage {
            &position.collateral_amount * &size_delta_usd / &position.size_in_usd
        } else {
            collateral_delta_amount
                .clone()
                .floor_at_zero()
                .min_of(position.collateral_amount.clone())
        };

        let next_size_usd = &position.size_in_usd - &size_delta_usd;
        let next_size_in_tokens = &position.size_in_tokens - &size_delta_in_tokens;

        let mut is_collateral_withdrawal_dropped = false;
        if !is_full_close && collateral_delta_amount.is_positive() {
            let next_collateral_usd = collateral.to_usd(
                &(&position.collateral_amount - &collateral_delta_amount),
                collateral_price,
            );
            let check = will_collateral_be_sufficient(
                &next_collateral_usd,
                &realized_pnl_usd,
                &next_size_usd,
                &info.config.min_collateral_factor,
            );
            if !check.is_sufficient() {
                collateral_delta_amount = BigInt::zero();
                is_collateral_withdrawal_dropped = true;
            }
        }

        let next_collateral_amount = &position.collateral_amount - &collateral_delta_amount;
        let next_collateral_usd = collateral.to_usd(&next_collateral_amount, collateral_price);
        let (next_leverage, next_liquidation_price) = if next_size_usd.is_positive() {
            let leverage = leverage(
                &next_size_usd,
                &next_collateral_usd,
                None,
                &position.pending_fees_usd(),
            );
            let liquidation_price = self
                .liquidation_params(
                    info,
                    position,
                    &next_size_usd,
                    &next_size_in_tokens,
                    &next_collateral_amount,
                )?
                .liquidation_price();
            (leverage, liquidation_price)
        } else {
            (None, None)
        };

        Some(DecreasePositionAmounts {
            size_delta_usd,
            size_delta_in_tokens,
            collateral_delta_amount,
            realized_pnl_usd,
            is_full_close,
            is_collateral_withdrawal_dropped,
            next_size_usd,
            next_collateral_amount,
            next_collateral_usd,
            next_leverage,
            next_liquidation_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{self, address, amount, eth, factor, usdc},
        utils::usd,
    };

    fn long_eth(collateral_token: Address, collateral_amount: BigInt) -> Position {
        // 10 ETH opened at $900.
        Position {
            account: address(100),
            market: address(10),
            collateral_token,
            is_long: true,
            size_in_usd: usd(9_000),
            size_in_tokens: amount(10, 18),
            collateral_amount,
            pending_borrowing_fees_usd: usd(3),
            pending_funding_fees_usd: usd(2),
            increased_at_block: 1,
            decreased_at_block: 0,
        }
    }

    #[test]
    fn entry_price_and_pnl() {
        let entry = entry_price(&usd(9_000), &amount(10, 18), 18).unwrap();
        assert_eq!(entry, usd(900));
        assert!(entry_price(&usd(9_000), &BigInt::zero(), 18).is_none());

        let long = position_pnl(&usd(9_000), &amount(10, 18), &usd(1_000), true, 18);
        assert_eq!(long, usd(1_000));
        let short = position_pnl(&usd(9_000), &amount(10, 18), &usd(1_000), false, 18);
        assert_eq!(short, -usd(1_000));
    }

    #[test]
    fn leverage_with_and_without_pnl() {
        let size = usd(10_000);
        let collateral = usd(1_005);
        let fees = usd(5);
        assert_eq!(leverage(&size, &collateral, None, &fees), Some(BigInt::from(100_000)));
        assert_eq!(
            leverage(&size, &collateral, Some(&usd(1_000)), &fees),
            Some(BigInt::from(50_000))
        );
        assert!(leverage(&size, &collateral, Some(&-usd(1_000)), &fees).is_none());
    }

    #[test]
    fn liquidation_price_of_stable_collateral_long() {
        let params = LiquidationPriceParams::builder()
            .size_in_usd(usd(10_000))
            .size_in_tokens(amount(10, 18))
            .collateral_amount(amount(1_000, 6))
            .collateral_usd(usd(1_000))
            .index_decimals(18)
            .min_collateral_usd(usd(1))
            .min_collateral_factor(factor(1, 2))
            .is_long(true)
            .build();
        assert_eq!(params.liquidation_collateral_usd(), usd(100));
        // `(100 - 1000 + 10000) / 10 = 910`.
        assert_eq!(params.liquidation_price(), Some(usd(910)));
    }

    #[test]
    fn liquidation_price_of_index_collateral_long() {
        let params = LiquidationPriceParams::builder()
            .size_in_usd(usd(10_000))
            .size_in_tokens(amount(10, 18))
            .collateral_amount(amount(1, 18))
            .collateral_usd(usd(1_000))
            .collateral_is_index_token(true)
            .index_decimals(18)
            .closing_fee_usd(usd(10))
            .min_collateral_usd(usd(1))
            .min_collateral_factor(factor(1, 2))
            .is_long(true)
            .build();
        // `(10000 + 100 + 10) / 11`.
        let expected = usd(10_110) / 11;
        assert_eq!(params.liquidation_price(), Some(expected));
    }

    #[test]
    fn liquidation_price_of_short() {
        let params = LiquidationPriceParams::builder()
            .size_in_usd(usd(10_000))
            .size_in_tokens(amount(10, 18))
            .collateral_amount(amount(1_000, 6))
            .collateral_usd(usd(1_000))
            .index_decimals(18)
            .min_collateral_usd(usd(200))
            .min_collateral_factor(factor(1, 2))
            .is_long(false)
            .build();
        // `(200 - 1000 - 10000) / -10 = 1080`.
        assert_eq!(params.liquidation_price(), Some(usd(1_080)));
    }

    #[test]
    fn collateral_sufficiency() {
        let factor = factor(1, 2);
        let check =
            will_collateral_be_sufficient(&usd(100), &BigInt::zero(), &usd(10_000), &factor);
        assert!(check.is_sufficient());
        assert_eq!(*check, usd(100));

        let check = will_collateral_be_sufficient(&usd(100), &-usd(1), &usd(10_000), &factor);
        assert!(!check.is_sufficient());
        assert_eq!(*check, usd(99));

        let check = will_collateral_be_sufficient(&usd(100), &usd(50), &usd(10_000), &factor);
        assert!(check.is_sufficient());
    }

    #[test]
    fn position_info_of_long() {
        let snapshot = test::snapshot();
        let position = long_eth(usdc(), amount(1_000, 6));
        let info = snapshot.position_info(&position).unwrap();
        assert_eq!(info.entry_price, Some(usd(900)));
        assert_eq!(info.mark_price, usd(1_000));
        assert_eq!(info.pnl, usd(1_000));
        assert_eq!(info.pnl_basis_points, BigInt::from(10_000));
        // `9000 * 0.05% = 4.5`.
        assert_eq!(info.closing_fee_usd, amount(45, 29));
        assert_eq!(info.pending_fees_usd, usd(5));
        assert_eq!(info.pnl_after_fees, usd(1_000) - usd(5) - amount(45, 29));
        assert_eq!(info.net_value, usd(2_000) - usd(5) - amount(45, 29));
        assert_eq!(info.remaining_collateral_usd, usd(995));
        assert_eq!(info.leverage, Some(usd(9_000) * 10_000 / usd(995)));
        assert!(info.liquidation_price.is_some());
    }

    #[test]
    fn position_info_values_after_fees() {
        let snapshot = test::snapshot();

        // Pnl `1000`, pending fees `5` and closing fee `4.5`.
        let long = snapshot
            .position_info(&long_eth(usdc(), amount(1_000, 6)))
            .unwrap();
        assert_eq!(long.pnl_after_fees, amount(9_905, 29));
        assert_eq!(long.net_value, amount(19_905, 29));
        // `990.5 / (1000 + 4.5)`.
        assert_eq!(long.pnl_after_fees_percentage, BigInt::from(9_860));
        assert_eq!(long.remaining_collateral_amount, Some(amount(995, 6)));
        assert!(!long.has_low_collateral);

        let short = Position {
            is_long: false,
            ..long_eth(usdc(), amount(1_000, 6))
        };
        let short = snapshot.position_info(&short).unwrap();
        assert_eq!(short.pnl, -usd(1_000));
        assert_eq!(short.pnl_after_fees, -amount(10_095, 29));
        assert_eq!(short.net_value, -amount(95, 29));
        // `-1009.5 / (1000 + 4.5)`, truncated toward zero.
        assert_eq!(short.pnl_after_fees_percentage, BigInt::from(-10_049));
        assert_eq!(short.remaining_collateral_amount, Some(amount(995, 6)));
    }

    #[test]
    fn position_info_of_low_collateral() {
        let snapshot = test::snapshot();

        // `9000 / (50 - 5) = 200x`.
        let info = snapshot
            .position_info(&long_eth(usdc(), amount(50, 6)))
            .unwrap();
        assert_eq!(info.leverage, Some(BigInt::from(2_000_000)));
        assert!(info.has_low_collateral);
        assert_eq!(info.remaining_collateral_amount, Some(amount(45, 6)));

        // Exactly `100x` is still allowed.
        let info = snapshot
            .position_info(&long_eth(usdc(), amount(95, 6)))
            .unwrap();
        assert_eq!(info.leverage, Some(BigInt::from(MAX_ALLOWED_LEVERAGE)));
        assert!(!info.has_low_collateral);

        let info = snapshot
            .position_info(&long_eth(usdc(), BigInt::zero()))
            .unwrap();
        assert!(info.collateral_usd.is_zero());
        assert!(info.pnl_after_fees_percentage.is_zero());
        assert!(info.pnl_basis_points.is_zero());
        assert!(info.leverage.is_none());
        assert!(!info.has_low_collateral);
        assert_eq!(info.remaining_collateral_amount, Some(-amount(5, 6)));
    }

    #[test]
    fn decrease_keeps_leverage() {
        let snapshot = test::snapshot();
        let position = long_eth(usdc(), amount(1_000, 6));
        let amounts = snapshot
            .decrease_position_amounts(&position, &usd(4_500), &BigInt::zero(), true)
            .unwrap();
        assert!(!amounts.is_full_close);
        assert_eq!(amounts.size_delta_in_tokens, amount(5, 18));
        assert_eq!(amounts.collateral_delta_amount, amount(500, 6));
        assert_eq!(amounts.realized_pnl_usd, usd(500));
        assert_eq!(amounts.next_size_usd, usd(4_500));
        assert_eq!(amounts.next_collateral_usd, usd(500));

        let full = snapshot
            .decrease_position_amounts(&position, &usd(100_000), &BigInt::zero(), false)
            .unwrap();
        assert!(full.is_full_close);
        assert_eq!(full.size_delta_usd, usd(9_000));
        assert_eq!(full.collateral_delta_amount, amount(1_000, 6));
        assert!(full.next_leverage.is_none());
    }

    #[test]
    fn insufficient_withdrawal_is_dropped() {
        let snapshot = test::snapshot();
        let position = long_eth(eth(), amount(1, 18));
        let amounts = snapshot
            .decrease_position_amounts(&position, &usd(1_000), &amount(99, 16), false)
            .unwrap();
        assert!(amounts.is_collateral_withdrawal_dropped);
        assert_eq!(amounts.collateral_delta_amount, BigInt::zero());
        assert_eq!(amounts.next_collateral_amount, amount(1, 18));
    }
}
