/// Decimals of USD values.
pub const USD_DECIMALS: u8 = 30;

/// Decimals of factors.
pub const FACTOR_DECIMALS: u8 = 30;

/// Basis points divisor.
pub const BASIS_POINTS_DIVISOR: u32 = 10_000;

/// Decimals used in the exponent computation of price impact.
pub const POW_DECIMALS: u8 = 10;

/// Default minimum collateral in USD, i.e. `$1`.
pub const DEFAULT_MIN_COLLATERAL_USD_UNITS: u32 = 1;

/// Price assigned to stable tokens when the oracle has not reported one, i.e. `$1`.
pub const DEFAULT_STABLE_PRICE_UNITS: u32 = 1;

/// Max leverage of a position in basis points, i.e. `100x`.
pub const MAX_ALLOWED_LEVERAGE: u32 = 1_000_000;
