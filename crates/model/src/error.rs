use crate::token::Address;

/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid Argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Empty swap.
    #[error("empty swap")]
    EmptySwap,
    /// Invalid prices.
    #[error("invalid prices")]
    InvalidPrices,
    /// Unknown computation error.
    #[error("unknown computation error: {0}")]
    Computation(&'static str),
    /// Power computation error.
    #[error("pow computation error")]
    PowComputation,
    /// Divided by zero.
    #[error("divided by zero")]
    DividedByZero,
    /// Convert error.
    #[error("convert value error")]
    Convert,
    /// Build params error.
    #[error("build params: {0}")]
    BuildParams(&'static str),
    /// Invalid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Market not found.
    #[error("market not found: {0}")]
    MarketNotFound(Address),
    /// Token not found.
    #[error("token not found: {0}")]
    TokenNotFound(Address),
    /// Duplicated market.
    #[error("duplicated market: {0}")]
    DuplicatedMarket(Address),
    /// Invalid position state.
    #[error("invalid position state: {0}")]
    InvalidPosition(&'static str),
}

impl Error {
    /// Create an [`InvalidArgument`](Error::InvalidArgument) error.
    pub fn invalid_argument(msg: &'static str) -> Self {
        Self::InvalidArgument(msg)
    }
}
