use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Price of one whole token in USD, with `30` decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Price {
    /// Minimum Price.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub min: BigInt,
    /// Maximum Price.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub max: BigInt,
}

impl Price {
    /// Create a new price.
    pub fn new(min: BigInt, max: BigInt) -> Self {
        Self { min, max }
    }

    /// Create a price with the same min and max value.
    pub fn exact(price: BigInt) -> Self {
        Self {
            min: price.clone(),
            max: price,
        }
    }

    /// Get mid price.
    pub fn mid(&self) -> BigInt {
        (&self.min + &self.max) / 2
    }

    /// Pick the max price if `maximize` is `true`, otherwise the min price.
    pub fn pick(&self, maximize: bool) -> &BigInt {
        if maximize {
            &self.max
        } else {
            &self.min
        }
    }

    /// Returns whether the price is usable for computations.
    pub fn is_valid(&self) -> bool {
        self.min.is_positive() && self.max.is_positive() && self.min <= self.max
    }

    /// Validate the price.
    pub fn validate(&self) -> crate::Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::Error::InvalidPrices)
        }
    }
}

/// Which price to use when valuing a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    /// Min price.
    Min,
    /// Max price.
    Max,
    /// Mid price.
    Mid,
}

impl PriceKind {
    /// Pick the price of the given kind.
    pub fn of(&self, price: &Price) -> BigInt {
        match self {
            Self::Min => price.min.clone(),
            Self::Max => price.max.clone(),
            Self::Mid => price.mid(),
        }
    }

    /// Create from a maximize flag.
    pub fn from_maximize(maximize: bool) -> Self {
        if maximize {
            Self::Max
        } else {
            Self::Min
        }
    }
}

/// Mark price of the index token.
///
/// Increasing a long or decreasing a short uses the max price,
/// the other cases use the min price.
pub fn mark_price(index_price: &Price, is_increase: bool, is_long: bool) -> &BigInt {
    index_price.pick(is_increase == is_long)
}

impl Default for Price {
    fn default() -> Self {
        Self::exact(BigInt::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::usd;

    #[test]
    fn mid_and_mark_price() {
        let price = Price::new(usd(1_999), usd(2_001));
        assert_eq!(price.mid(), usd(2_000));
        assert_eq!(mark_price(&price, true, true), &usd(2_001));
        assert_eq!(mark_price(&price, true, false), &usd(1_999));
        assert_eq!(mark_price(&price, false, true), &usd(1_999));
        assert_eq!(mark_price(&price, false, false), &usd(2_001));
    }

    #[test]
    fn validate() {
        assert!(Price::exact(usd(1)).validate().is_ok());
        assert!(Price::default().validate().is_err());
        assert!(Price::new(usd(2), usd(1)).validate().is_err());
    }
}
