use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;
use synthetics_model::{constants::USD_DECIMALS, fixed::pow10, BigInt};

const MAX_SCALE: u32 = 28;
const MAX_REPR: u128 = 0x0000_0000_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF;

/// Convert a fixed-point number with the given decimals to [`Decimal`].
///
/// Digits that do not fit are truncated. Returns `None` if the integer part
/// cannot be represented as a [`Decimal`].
///
/// # Examples
///
/// ```
/// use synthetics_sdk::{model::BigInt, utils::amount_to_decimal};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     amount_to_decimal(&BigInt::from(-100_451_723_195i64), 6),
///     Some(dec!(-100_451.723195)),
/// );
/// ```
pub fn amount_to_decimal(num: &BigInt, decimals: u8) -> Option<Decimal> {
    let is_negative = num.is_negative();
    let mut magnitude = num.abs();
    let mut scale = decimals as u32;
    let max_repr = BigInt::from(MAX_REPR);
    while scale > MAX_SCALE || magnitude > max_repr {
        if scale == 0 {
            return None;
        }
        magnitude /= 10;
        scale -= 1;
    }
    let d = Decimal::try_from_i128_with_scale(magnitude.to_i128()?, scale).ok()?;
    Some(if is_negative { -d } else { d })
}

/// Convert a USD value to [`Decimal`].
///
/// # Examples
///
/// ```
/// use synthetics_sdk::{model::utils::usd, utils::value_to_decimal};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(value_to_decimal(&usd(22_689)), Some(dec!(22689)));
/// ```
pub fn value_to_decimal(num: &BigInt) -> Option<Decimal> {
    amount_to_decimal(num, USD_DECIMALS)
}

/// Convert a [`Decimal`] to a fixed-point number with the given decimals,
/// truncating extra digits.
///
/// # Errors
/// Returns error if the decimal is negative.
pub fn decimal_to_amount(num: Decimal, decimals: u8) -> crate::Result<BigInt> {
    if num.is_sign_negative() && !num.is_zero() {
        return Err(crate::Error::unknown("amount must not be negative"));
    }
    let mantissa = BigInt::from(num.mantissa());
    let scale = num.scale();
    let decimals = decimals as u32;
    if decimals >= scale {
        Ok(mantissa * pow10(decimals - scale))
    } else {
        Ok(mantissa / pow10(scale - decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use synthetics_model::utils::usd;

    #[test]
    fn convert_value_to_decimal() {
        assert_eq!(
            value_to_decimal(&BigInt::from(2_268_944_690_310_400_000_000_000_000_000_000u128)),
            Some(dec!(2268.9446903104))
        );
        assert_eq!(value_to_decimal(&-usd(5)), Some(dec!(-5)));
        assert_eq!(value_to_decimal(&BigInt::zero()), Some(Decimal::ZERO));
        assert_eq!(
            amount_to_decimal(&BigInt::from(u128::MAX), 0),
            None,
        );
        assert_eq!(
            amount_to_decimal(&BigInt::from(1), 46),
            Some(Decimal::ZERO),
        );
    }

    #[test]
    fn convert_decimal_to_amount() -> crate::Result<()> {
        assert_eq!(decimal_to_amount(dec!(1.5), 6)?, BigInt::from(1_500_000));
        assert_eq!(decimal_to_amount(dec!(0.1234567), 6)?, BigInt::from(123_456));
        assert_eq!(decimal_to_amount(dec!(1000), 30)?, usd(1_000));
        assert!(decimal_to_amount(dec!(-1), 6).is_err());
        Ok(())
    }
}
