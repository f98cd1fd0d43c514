/// Price impact params.
pub mod price_impact;

/// Fee params.
pub mod fee;

/// Market config.
pub mod market;

/// Gas limits.
pub mod gas;

pub use self::{
    fee::MarketFeesConfig,
    gas::{ActionKind, GasLimitsConfig},
    market::MarketConfig,
    price_impact::PriceImpactParams,
};
