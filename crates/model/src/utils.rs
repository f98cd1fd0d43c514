use num_bigint::BigInt;
use num_traits::Zero;

use crate::{
    constants::{BASIS_POINTS_DIVISOR, FACTOR_DECIMALS, USD_DECIMALS},
    fixed::{pow10, Fixed},
    num::MulDiv,
};

/// Returns `value * 10^decimals`.
#[inline]
pub fn expand_decimals(value: impl Into<BigInt>, decimals: u8) -> BigInt {
    value.into() * pow10(decimals as u32)
}

/// The unit value of factors, i.e. `10^30`.
#[inline]
pub fn precision() -> BigInt {
    pow10(FACTOR_DECIMALS as u32)
}

/// Returns a USD value of the given whole units.
#[inline]
pub fn usd(units: impl Into<BigInt>) -> BigInt {
    expand_decimals(units, USD_DECIMALS)
}

/// Apply factor using this formula: `A * x`.
///
/// `factor` is expected to be a fixed-point decimal with [`FACTOR_DECIMALS`] decimals.
#[inline]
pub fn apply_factor(value: &BigInt, factor: &BigInt) -> BigInt {
    value * factor / precision()
}

/// Apply the price impact curve using this formula: `x^E * A / 2`.
///
/// Assuming that all values are "float"s with [`FACTOR_DECIMALS`] decimals.
pub fn apply_impact_factor(
    diff_usd: &BigInt,
    factor: &BigInt,
    exponent_factor: &BigInt,
) -> crate::Result<BigInt> {
    let value = Fixed::<FACTOR_DECIMALS>::from_inner(diff_usd.clone());
    let exponent = Fixed::<FACTOR_DECIMALS>::from_inner(exponent_factor.clone());
    let powered = value
        .checked_pow(&exponent)
        .ok_or(crate::Error::PowComputation)?;
    Ok(apply_factor(powered.get(), factor) / 2)
}

/// Convert the `value` to a factor after dividing by the `divisor`.
///
/// ## Notes
/// - Return `zero` if the `divisor` is zero.
pub fn div_to_factor(value: &BigInt, divisor: &BigInt, round_up_magnitude: bool) -> BigInt {
    let ans = if round_up_magnitude {
        value.checked_mul_div_ceil(&precision(), divisor)
    } else {
        value.checked_mul_div(&precision(), divisor)
    };
    ans.unwrap_or_else(BigInt::zero)
}

/// Returns `numerator / denominator` in basis points.
///
/// ## Notes
/// - Return `zero` if the `denominator` is zero.
pub fn basis_points(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    numerator
        .checked_mul_div(&BigInt::from(BASIS_POINTS_DIVISOR), denominator)
        .unwrap_or_else(BigInt::zero)
}

/// Convert a token amount to USD value.
#[inline]
pub fn convert_to_usd(amount: &BigInt, decimals: u8, price: &BigInt) -> BigInt {
    amount * price / pow10(decimals as u32)
}

/// Convert a USD value to a token amount.
///
/// Returns `None` if the `price` is zero.
#[inline]
pub fn convert_to_token_amount(usd: &BigInt, decimals: u8, price: &BigInt) -> Option<BigInt> {
    usd.checked_mul_div(&pow10(decimals as u32), price)
}

/// Convert a USD price of one whole token to the price of one unit of the token.
#[inline]
pub fn convert_to_contract_price(price: &BigInt, decimals: u8) -> BigInt {
    price / pow10(decimals as u32)
}

/// Convert the price of one unit of the token to the USD price of one whole token.
#[inline]
pub fn convert_from_contract_price(price: &BigInt, decimals: u8) -> BigInt {
    price * pow10(decimals as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_amounts() {
        let price = usd(2_000);
        let amount = expand_decimals(3, 18);
        let value = convert_to_usd(&amount, 18, &price);
        assert_eq!(value, usd(6_000));
        assert_eq!(convert_to_token_amount(&value, 18, &price), Some(amount));
        assert_eq!(convert_to_token_amount(&value, 18, &BigInt::zero()), None);
        assert_eq!(convert_to_contract_price(&price, 18), expand_decimals(2_000, 12));
    }

    #[test]
    fn basis_points_of_zero_denominator() {
        assert_eq!(basis_points(&usd(1), &BigInt::zero()), BigInt::zero());
        assert_eq!(basis_points(&usd(1), &usd(100)), BigInt::from(100));
    }

    #[test]
    fn impact_factor_with_unit_exponent() -> crate::Result<()> {
        // 0.001 with a unit exponent: `1000 * 0.001 / 2 = 0.5`.
        let factor = expand_decimals(1, 27);
        let impact = apply_impact_factor(&usd(1_000), &factor, &precision())?;
        assert_eq!(impact, expand_decimals(5, 29));
        Ok(())
    }
}
