use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::{Decimal, MathematicalOps};

use crate::{constants::POW_DECIMALS, num::MulDiv};

/// Returns `10^exponent`.
pub fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10u8).pow(exponent)
}

/// Fixed-point decimal type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Fixed<const DECIMALS: u8>(BigInt);

impl<const DECIMALS: u8> Fixed<DECIMALS> {
    /// The decimals.
    pub const DECIMALS: u8 = DECIMALS;

    /// The unit value, i.e. `10^DECIMALS`.
    pub fn unit() -> BigInt {
        pow10(DECIMALS as u32)
    }

    /// The value "one".
    pub fn one() -> Self {
        Self(Self::unit())
    }

    /// Get the internal integer representation.
    pub fn get(&self) -> &BigInt {
        &self.0
    }

    /// Create a new decimal from the inner representation.
    #[inline]
    pub fn from_inner(inner: BigInt) -> Self {
        Self(inner)
    }

    /// Get the inner value.
    #[inline]
    pub fn into_inner(self) -> BigInt {
        self.0
    }

    /// Returns whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns whether the value is one.
    pub fn is_one(&self) -> bool {
        self.0 == Self::unit()
    }

    /// Checked multiplication.
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        Some(Self(self.0.checked_mul_div(&other.0, &Self::unit())?))
    }

    /// Checked pow.
    ///
    /// The power is evaluated with [`Decimal`] at [`POW_DECIMALS`] decimals,
    /// so the result is an approximation unless the exponent is one or the
    /// base is zero.
    pub fn checked_pow(&self, exponent: &Self) -> Option<Self> {
        if self.0.is_negative() || exponent.0.is_negative() {
            return None;
        }
        if self.is_zero() {
            return Some(Self(BigInt::zero()));
        }
        if exponent.is_one() {
            return Some(self.clone());
        }
        if exponent.is_zero() {
            return Some(Self::one());
        }
        let value = to_decimal::<DECIMALS>(&self.0)?;
        let exponent = to_decimal::<DECIMALS>(&exponent.0)?;
        let ans = value.checked_powd(exponent)?;
        from_decimal::<DECIMALS>(ans).map(Self)
    }
}

fn to_decimal<const DECIMALS: u8>(value: &BigInt) -> Option<Decimal> {
    let (decimals, target) = (DECIMALS as u32, POW_DECIMALS as u32);
    let value = if decimals >= target {
        value / pow10(decimals - target)
    } else {
        value * pow10(target - decimals)
    };
    Decimal::try_from_i128_with_scale(value.to_i128()?, target).ok()
}

fn from_decimal<const DECIMALS: u8>(value: Decimal) -> Option<BigInt> {
    let (decimals, scale) = (DECIMALS as u32, value.scale());
    let mantissa = BigInt::from(value.mantissa());
    if decimals >= scale {
        Some(mantissa * pow10(decimals - scale))
    } else {
        Some(mantissa / pow10(scale - decimals))
    }
}

/// Fixed-point value with `30` decimals.
pub type Fixed30 = Fixed<30>;
