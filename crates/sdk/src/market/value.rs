use synthetics_model::{price::Price, BigInt};

/// Min max values.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Value {
    /// Min value.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub min: BigInt,
    /// Max value.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max: BigInt,
}

impl Value {
    /// Pick the max value if `maximize`, otherwise the min value.
    pub fn pick(&self, maximize: bool) -> &BigInt {
        if maximize {
            &self.max
        } else {
            &self.min
        }
    }
}

impl From<Value> for Price {
    fn from(value: Value) -> Self {
        Price::new(value.min, value.max)
    }
}

impl From<Price> for Value {
    fn from(price: Price) -> Self {
        Self {
            min: price.min,
            max: price.max,
        }
    }
}
