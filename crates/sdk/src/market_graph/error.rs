use synthetics_model::Address;

/// Market graph error.
#[derive(Debug, thiserror::Error)]
pub enum MarketGraphError {
    /// A swap cycle keeps increasing the output, the estimations are invalid.
    #[error("swap cycle through market `{market}` keeps increasing the output")]
    NegativeCycle {
        /// A market on the cycle.
        market: Address,
    },
}
