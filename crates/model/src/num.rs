use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Multiplication followed by division with full precision.
pub trait MulDiv: Sized {
    /// Calculates `self * numerator / denominator`, truncated toward zero.
    ///
    /// Returns `None` if the `denominator` is zero.
    fn checked_mul_div(&self, numerator: &Self, denominator: &Self) -> Option<Self>;

    /// Calculates `self * numerator / denominator` with the magnitude rounded up.
    ///
    /// Returns `None` if the `denominator` is zero.
    fn checked_mul_div_ceil(&self, numerator: &Self, denominator: &Self) -> Option<Self>;
}

impl MulDiv for BigInt {
    fn checked_mul_div(&self, numerator: &Self, denominator: &Self) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(self * numerator / denominator)
    }

    fn checked_mul_div_ceil(&self, numerator: &Self, denominator: &Self) -> Option<Self> {
        checked_round_up_magnitude_div(&(self * numerator), denominator)
    }
}

/// Divide and round the magnitude of the quotient up.
///
/// Returns `None` if the `divisor` is zero.
///
/// # Examples
///
/// ```
/// # use synthetics_model::num::checked_round_up_magnitude_div;
/// # use synthetics_model::BigInt;
/// let three = BigInt::from(3);
/// assert_eq!(checked_round_up_magnitude_div(&BigInt::from(1), &three), Some(BigInt::from(1)));
/// assert_eq!(checked_round_up_magnitude_div(&BigInt::from(-1), &three), Some(BigInt::from(-1)));
/// assert_eq!(checked_round_up_magnitude_div(&BigInt::from(6), &three), Some(BigInt::from(2)));
/// ```
pub fn checked_round_up_magnitude_div(value: &BigInt, divisor: &BigInt) -> Option<BigInt> {
    if divisor.is_zero() {
        return None;
    }
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.is_zero() {
        Some(quotient)
    } else if value.is_negative() == divisor.is_negative() {
        Some(quotient + BigInt::one())
    } else {
        Some(quotient - BigInt::one())
    }
}

/// Signed value helpers.
pub trait SignedExt {
    /// Returns zero if the value is negative.
    fn floor_at_zero(self) -> Self;

    /// Returns the smaller one of the two values.
    fn min_of(self, other: Self) -> Self;
}

impl SignedExt for BigInt {
    fn floor_at_zero(self) -> Self {
        if self.is_negative() {
            Self::zero()
        } else {
            self
        }
    }

    fn min_of(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_magnitude_division() {
        let b = BigInt::from(3);
        assert_eq!(
            checked_round_up_magnitude_div(&BigInt::from(1), &b),
            Some(BigInt::from(1))
        );
        assert_eq!(
            checked_round_up_magnitude_div(&BigInt::from(-1), &b),
            Some(BigInt::from(-1))
        );
        assert_eq!(
            checked_round_up_magnitude_div(&BigInt::from(-7), &b),
            Some(BigInt::from(-3))
        );
        assert_eq!(
            checked_round_up_magnitude_div(&BigInt::from(7), &BigInt::from(-3)),
            Some(BigInt::from(-3))
        );
        assert_eq!(checked_round_up_magnitude_div(&b, &BigInt::zero()), None);
    }

    #[test]
    fn mul_div_truncates_toward_zero() {
        let a = BigInt::from(-10);
        let ans = a.checked_mul_div(&BigInt::from(1), &BigInt::from(3));
        assert_eq!(ans, Some(BigInt::from(-3)));
        let ans = a.checked_mul_div_ceil(&BigInt::from(1), &BigInt::from(3));
        assert_eq!(ans, Some(BigInt::from(-4)));
    }

    #[test]
    fn mul_div_ceil() {
        let a = BigInt::from(650_406_504u64);
        let a2 = BigInt::from(650_406_505u64);
        let b = BigInt::from(40_000_000_000u64);
        let c = BigInt::from(80_000_000_000u64);
        assert_eq!(
            a.checked_mul_div_ceil(&b, &c),
            Some(BigInt::from(325_203_252u64))
        );
        assert_eq!(
            a2.checked_mul_div_ceil(&b, &c),
            Some(BigInt::from(325_203_253u64))
        );
    }

    #[test]
    fn floor_at_zero() {
        assert_eq!(BigInt::from(-5).floor_at_zero(), BigInt::zero());
        assert_eq!(BigInt::from(5).floor_at_zero(), BigInt::from(5));
    }
}
