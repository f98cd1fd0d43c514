#![deny(missing_docs)]
#![deny(unreachable_pub)]

//! Fee, price impact and position valuation model for GMX synthetics markets.

/// Constants.
pub mod constants;

/// Number utils.
pub mod num;

/// Fixed-point decimal type.
pub mod fixed;

/// Utils.
pub mod utils;

/// Price.
pub mod price;

/// Token.
pub mod token;

/// Pool.
pub mod pool;

/// Market params.
pub mod params;

/// Market.
pub mod market;

/// Snapshot of markets state.
pub mod snapshot;

/// Fees and price impact.
pub mod fees;

/// Position.
pub mod position;

/// Error type.
pub mod error;


pub use error::Error;
pub use market::{Market, MarketInfo};
pub use num_bigint::BigInt;
pub use position::{Position, PositionInfo};
pub use price::Price;
pub use snapshot::MarketsSnapshot;
pub use token::{Address, Token};

/// Alias for result.
pub type Result<T> = std::result::Result<T, Error>;
