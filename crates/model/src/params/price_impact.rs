use num_bigint::BigInt;
use typed_builder::TypedBuilder;

/// Price impact parameters.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PriceImpactParams {
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    exponent: BigInt,
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    positive_factor: BigInt,
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    negative_factor: BigInt,
}

impl PriceImpactParams {
    /// Exponent.
    pub fn exponent(&self) -> &BigInt {
        &self.exponent
    }

    /// Positive factor.
    pub fn positive_factor(&self) -> &BigInt {
        &self.positive_factor
    }

    /// Negative factor.
    pub fn negative_factor(&self) -> &BigInt {
        &self.negative_factor
    }

    /// Factor for the given direction of impact.
    pub fn factor(&self, is_positive: bool) -> &BigInt {
        if is_positive {
            &self.positive_factor
        } else {
            &self.negative_factor
        }
    }
}
